//! Access-token gate for every route except sign-up, login and `/`.

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};

use super::AppState;
use crate::errors::AppError;

/// Header the restaurant clients send their access token in. A standard
/// `Authorization: Bearer <token>` header is accepted too.
pub const TOKEN_HEADER: &str = "token";

/// Verify the request's access token and stash its claims in the request
/// extensions. Failures answer 401 without reaching the handler.
pub async fn require_token(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error> {
    match authenticate(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(e) => {
            log::warn!("rejected {} {}: {}", req.method(), req.path(), e);
            Ok(req.error_response(e).map_into_right_body())
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<crate::domain::records::AuthClaims, AppError> {
    let token = bearer_token(req).ok_or_else(|| {
        AppError::Unauthorized("No Authorization header provided".to_string())
    })?;
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state missing".to_string()))?;
    Ok(state.users.authenticate(token)?)
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    let headers = req.headers();
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(token);
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}
