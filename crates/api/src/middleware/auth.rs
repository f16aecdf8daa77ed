//! Authentication extractors.
//!
//! Identity is carried in an `Authorization: Bearer <token>` header and
//! verified against the token service in state. There is no session;
//! every request re-proves who it is from.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::models::Identity;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(identity): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.email)
/// }
/// ```
pub struct RequireAuth(pub Identity);

/// Extractor that additionally requires the `admin` role.
pub struct RequireAdmin(pub Identity);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// Missing, malformed, expired, or wrongly-signed token.
    Unauthorized,
    /// Valid token, but the role does not permit the operation.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::failure("Authentication required")),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::failure("Admin access required")),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = identity_from_parts(parts, state)?;
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = identity_from_parts(parts, state)?;
        if !identity.is_admin() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(identity))
    }
}

/// Pull the bearer token out of the header and verify it.
///
/// All token failures collapse into one rejection so a caller cannot
/// probe why a token was refused.
fn identity_from_parts(parts: &Parts, state: &AppState) -> Result<Identity, AuthRejection> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthRejection::Unauthorized)?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthRejection::Unauthorized)?;

    state
        .tokens()
        .verify(token)
        .ok_or(AuthRejection::Unauthorized)
}
