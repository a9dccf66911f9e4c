pub mod auth;
pub mod foods;
pub mod menus;
pub mod order_items;
pub mod orders;
pub mod tables;
pub mod users;

use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::application::restaurant_service::RestaurantService;
use crate::application::user_service::UserService;
use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Shared by every worker; the services carry the injected store.
#[derive(Clone)]
pub struct AppState {
    pub service: RestaurantService,
    pub users: UserService,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: RestaurantService, users: UserService, request_timeout: Duration) -> Self {
        Self {
            service,
            users,
            request_timeout,
        }
    }
}

/// Run restaurant store work under the request deadline.
pub(crate) async fn run<T, F>(state: &AppState, work: F) -> Result<T, AppError>
where
    F: FnOnce(&RestaurantService) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    with_deadline(state.request_timeout, state.service.clone(), work).await
}

/// Run account work under the request deadline.
pub(crate) async fn run_users<T, F>(state: &AppState, work: F) -> Result<T, AppError>
where
    F: FnOnce(&UserService) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    with_deadline(state.request_timeout, state.users.clone(), work).await
}

/// Run blocking work off the async workers. Work still running at the
/// deadline is abandoned.
async fn with_deadline<S, T, F>(deadline: Duration, service: S, work: F) -> Result<T, AppError>
where
    S: Send + 'static,
    F: FnOnce(&S) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(deadline, web::block(move || work(&service))).await {
        Ok(joined) => Ok(joined.map_err(|e| AppError::Internal(e.to_string()))??),
        Err(_) => Err(DomainError::Timeout(deadline.as_secs()).into()),
    }
}

/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "msg": "Server running successfully" }))
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": "Route not found",
        "path": req.path(),
        "message": "Check your endpoint"
    }))
}

pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<bigdecimal::BigDecimal, AppError> {
    raw.parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", field, raw, e)))
}
