use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{parse_decimal, run, AppState};
use crate::domain::records::{Food, FoodPatch, NewFood};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFoodRequest {
    pub name: String,
    /// Decimal price as a string, e.g. "9.99"; stored rounded to two digits.
    pub price: String,
    #[serde(default)]
    pub food_image: String,
    pub menu_id: Uuid,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub price: Option<String>,
    pub food_image: Option<String>,
    pub menu_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FoodResponse {
    pub id: Uuid,
    pub name: String,
    pub price: String,
    pub food_image: String,
    pub menu_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Food> for FoodResponse {
    fn from(f: Food) -> Self {
        Self {
            id: f.id,
            name: f.name,
            price: f.price.to_string(),
            food_image: f.food_image,
            menu_id: f.menu_id,
            created_at: f.created_at.to_rfc3339(),
            updated_at: f.updated_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /foods
#[utoipa::path(
    get,
    path = "/foods",
    responses((status = 200, description = "All food items", body = [FoodResponse])),
    tag = "foods"
)]
pub async fn list_foods(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let foods = run(&state, |svc| svc.list_foods()).await?;
    let body: Vec<FoodResponse> = foods.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /foods/{id}
#[utoipa::path(
    get,
    path = "/foods/{id}",
    params(("id" = Uuid, Path, description = "Food UUID")),
    responses(
        (status = 200, description = "Food found", body = FoodResponse),
        (status = 404, description = "Food not found"),
    ),
    tag = "foods"
)]
pub async fn get_food(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let food = run(&state, move |svc| svc.get_food(id)).await?;
    Ok(HttpResponse::Ok().json(FoodResponse::from(food)))
}

/// POST /foods
///
/// The referenced menu must exist.
#[utoipa::path(
    post,
    path = "/foods",
    request_body = CreateFoodRequest,
    responses(
        (status = 201, description = "Food created", body = FoodResponse),
        (status = 400, description = "Invalid price or unknown menu"),
    ),
    tag = "foods"
)]
pub async fn create_food(
    state: web::Data<AppState>,
    body: web::Json<CreateFoodRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let price = parse_decimal("price", &body.price)?;
    let food = run(&state, move |svc| {
        svc.create_food(NewFood {
            name: body.name,
            price,
            food_image: body.food_image,
            menu_id: body.menu_id,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(FoodResponse::from(food)))
}

/// PATCH /foods/{id}
#[utoipa::path(
    patch,
    path = "/foods/{id}",
    params(("id" = Uuid, Path, description = "Food UUID")),
    request_body = UpdateFoodRequest,
    responses(
        (status = 200, description = "Food updated", body = FoodResponse),
        (status = 400, description = "Invalid price or unknown menu"),
        (status = 404, description = "Food not found"),
    ),
    tag = "foods"
)]
pub async fn update_food(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateFoodRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let price = body
        .price
        .as_deref()
        .map(|raw| parse_decimal("price", raw))
        .transpose()?;
    let food = run(&state, move |svc| {
        svc.update_food(
            id,
            FoodPatch {
                name: body.name,
                price,
                food_image: body.food_image,
                menu_id: body.menu_id,
            },
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(FoodResponse::from(food)))
}
