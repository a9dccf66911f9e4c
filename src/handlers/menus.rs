use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{run, AppState};
use crate::domain::records::{Menu, MenuPatch, NewMenu};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuRequest {
    pub name: String,
    pub category: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateMenuRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    /// Only validated when `end_date` is sent too.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Menu> for MenuResponse {
    fn from(m: Menu) -> Self {
        Self {
            id: m.id,
            name: m.name,
            category: m.category,
            start_date: m.start_date.map(|d| d.to_rfc3339()),
            end_date: m.end_date.map(|d| d.to_rfc3339()),
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /menus
#[utoipa::path(
    get,
    path = "/menus",
    responses((status = 200, description = "All menus", body = [MenuResponse])),
    tag = "menus"
)]
pub async fn list_menus(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let menus = run(&state, |svc| svc.list_menus()).await?;
    let body: Vec<MenuResponse> = menus.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /menus/{id}
#[utoipa::path(
    get,
    path = "/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu UUID")),
    responses(
        (status = 200, description = "Menu found", body = MenuResponse),
        (status = 404, description = "Menu not found"),
    ),
    tag = "menus"
)]
pub async fn get_menu(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let menu = run(&state, move |svc| svc.get_menu(id)).await?;
    Ok(HttpResponse::Ok().json(MenuResponse::from(menu)))
}

/// POST /menus
#[utoipa::path(
    post,
    path = "/menus",
    request_body = CreateMenuRequest,
    responses(
        (status = 201, description = "Menu created", body = MenuResponse),
        (status = 400, description = "Invalid menu"),
    ),
    tag = "menus"
)]
pub async fn create_menu(
    state: web::Data<AppState>,
    body: web::Json<CreateMenuRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let menu = run(&state, move |svc| {
        svc.create_menu(NewMenu {
            name: body.name,
            category: body.category,
            start_date: body.start_date,
            end_date: body.end_date,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(MenuResponse::from(menu)))
}

/// PATCH /menus/{id}
///
/// When both dates are sent the window must start in the future and end after
/// it starts.
#[utoipa::path(
    patch,
    path = "/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu UUID")),
    request_body = UpdateMenuRequest,
    responses(
        (status = 200, description = "Menu updated", body = MenuResponse),
        (status = 400, description = "Invalid date window"),
        (status = 404, description = "Menu not found"),
    ),
    tag = "menus"
)]
pub async fn update_menu(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMenuRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let menu = run(&state, move |svc| {
        svc.update_menu(
            id,
            MenuPatch {
                name: body.name,
                category: body.category,
                start_date: body.start_date,
                end_date: body.end_date,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(MenuResponse::from(menu)))
}
