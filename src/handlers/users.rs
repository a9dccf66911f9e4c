use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{run_users, AppState};
use crate::domain::records::{SignUp, User};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account; never carries the password hash or tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            avatar: u.avatar,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

/// The signed-in account plus its freshly issued tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
}

impl From<User> for SessionResponse {
    fn from(mut u: User) -> Self {
        let token = u.token.take();
        let refresh_token = u.refresh_token.take();
        Self {
            user: u.into(),
            token,
            refresh_token,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All accounts", body = [UserResponse]),
        (status = 401, description = "Missing or invalid token"),
    ),
    tag = "users"
)]
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = run_users(&state, |svc| svc.list_users()).await?;
    let body: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /users/{id}
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "Account found", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let user = run_users(&state, move |svc| svc.get_user(id)).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// POST /users/signup
#[utoipa::path(
    post,
    path = "/users/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid sign-up data"),
        (status = 409, description = "Email or phone already registered"),
    ),
    tag = "users"
)]
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let user = run_users(&state, move |svc| {
        svc.sign_up(SignUp {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            avatar: body.avatar,
            password: body.password,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(SessionResponse::from(user)))
}

/// POST /users/login
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Wrong email or password"),
    ),
    tag = "users"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { email, password } = body.into_inner();
    let user = run_users(&state, move |svc| svc.login(&email, &password)).await?;
    Ok(HttpResponse::Ok().json(SessionResponse::from(user)))
}
