use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::records::OrderLineInput;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Failed to create order")]
    RejectedItems(Vec<OrderLineInput>),

    #[error("Record store unavailable")]
    StoreUnavailable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(entity) => AppError::NotFound(entity),
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DomainError::RejectedLineItems(items) => AppError::RejectedItems(items),
            DomainError::StoreUnavailable(msg) => {
                log::error!("record store failure: {}", msg);
                AppError::StoreUnavailable(msg)
            }
            DomainError::Timeout(secs) => {
                log::error!("request abandoned after {}s deadline", secs);
                AppError::Timeout
            }
            DomainError::MalformedQuery(msg) | DomainError::Internal(msg) => {
                log::error!("internal failure: {}", msg);
                AppError::Internal(msg)
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(json!({
                "error": self.to_string()
            })),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(json!({
                "error": self.to_string()
            })),
            AppError::Conflict(_) => HttpResponse::Conflict().json(json!({
                "error": self.to_string()
            })),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(json!({
                "error": self.to_string()
            })),
            AppError::RejectedItems(items) => {
                let items: Vec<serde_json::Value> = items
                    .iter()
                    .map(|i| json!({ "food_id": i.food_id, "quantity": i.quantity }))
                    .collect();
                HttpResponse::BadRequest().json(json!({
                    "error": self.to_string(),
                    "items": items
                }))
            }
            AppError::StoreUnavailable(_) | AppError::Timeout => HttpResponse::InternalServerError()
                .json(json!({
                    "error": self.to_string()
                })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })),
        }
    }
}
