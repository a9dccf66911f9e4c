use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{run, AppState};
use crate::domain::records::{NewTable, Table, TablePatch};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub table_number: i32,
    pub number_of_guests: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub table_number: Option<i32>,
    pub number_of_guests: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableResponse {
    pub id: Uuid,
    pub table_number: i32,
    pub number_of_guests: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Table> for TableResponse {
    fn from(t: Table) -> Self {
        Self {
            id: t.id,
            table_number: t.table_number,
            number_of_guests: t.number_of_guests,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /tables
#[utoipa::path(
    get,
    path = "/tables",
    responses(
        (status = 200, description = "All tables", body = [TableResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "tables"
)]
pub async fn list_tables(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let tables = run(&state, |svc| svc.list_tables()).await?;
    let body: Vec<TableResponse> = tables.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /tables/{id}
#[utoipa::path(
    get,
    path = "/tables/{id}",
    params(("id" = Uuid, Path, description = "Table UUID")),
    responses(
        (status = 200, description = "Table found", body = TableResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "tables"
)]
pub async fn get_table(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let table = run(&state, move |svc| svc.get_table(id)).await?;
    Ok(HttpResponse::Ok().json(TableResponse::from(table)))
}

/// POST /tables
#[utoipa::path(
    post,
    path = "/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = TableResponse),
        (status = 400, description = "Invalid table"),
    ),
    tag = "tables"
)]
pub async fn create_table(
    state: web::Data<AppState>,
    body: web::Json<CreateTableRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let table = run(&state, move |svc| {
        svc.create_table(NewTable {
            table_number: body.table_number,
            number_of_guests: body.number_of_guests,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(TableResponse::from(table)))
}

/// PATCH /tables/{id}
#[utoipa::path(
    patch,
    path = "/tables/{id}",
    params(("id" = Uuid, Path, description = "Table UUID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = TableResponse),
        (status = 404, description = "Table not found"),
    ),
    tag = "tables"
)]
pub async fn update_table(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTableRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let table = run(&state, move |svc| {
        svc.update_table(
            id,
            TablePatch {
                table_number: body.table_number,
                number_of_guests: body.number_of_guests,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(TableResponse::from(table)))
}
