use thiserror::Error;

use super::records::OrderLineInput;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Failed to create order: {} invalid line item(s)", .0.len())]
    RejectedLineItems(Vec<OrderLineInput>),
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Malformed aggregation pipeline: {0}")]
    MalformedQuery(String),
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Internal error: {0}")]
    Internal(String),
}
