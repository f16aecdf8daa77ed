//! Authentication route handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use clementine_core::Role;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body. The role pins which sign-in surface the caller
/// came from and defaults to `user` when absent.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// User plus a freshly issued bearer token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiResponse<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .register(&body.name, &body.email, &body.password)
        .await?;
    let token = state.tokens().issue(user.id, &user.email, user.role)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(ApiResponse::success(AuthResponse { user, token }))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password, body.role)
        .await?;
    let token = state.tokens().issue(user.id, &user.email, user.role)?;

    Ok(ApiResponse::success(AuthResponse { user, token }))
}

/// `GET /auth/me`
pub async fn me(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<User>> {
    let user = AuthService::new(state.pool())
        .get_user(identity.user_id)
        .await?;
    Ok(ApiResponse::success(user))
}
