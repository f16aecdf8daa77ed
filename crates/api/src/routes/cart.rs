//! Cart route handlers. All of them act on the caller's own cart.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use clementine_core::ProductId;

use crate::db::{CartRepository, ProductRepository};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CartAction};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Cart mutation request body.
#[derive(Debug, Deserialize)]
pub struct CartMutation {
    pub product_id: ProductId,
    /// Defaults to 1. Ignored for `remove`.
    pub quantity: Option<i32>,
    /// Defaults to `increment`.
    pub action: Option<CartAction>,
}

/// `GET /cart`
pub async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_for_user(identity.user_id)
        .await?;
    Ok(ApiResponse::success(cart))
}

/// `POST /cart`
///
/// The product must exist in the catalog; there is no stock check at
/// this point, only at order time.
pub async fn mutate(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CartMutation>,
) -> Result<ApiResponse<Cart>> {
    ProductRepository::new(state.pool()).get(body.product_id).await?;

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_for_user(identity.user_id).await?;

    carts
        .apply(
            cart.id,
            body.product_id,
            body.action.unwrap_or_default(),
            body.quantity.unwrap_or(1),
        )
        .await?;

    let cart = carts.get_for_user(identity.user_id).await?;
    Ok(ApiResponse::success(cart))
}

/// `DELETE /cart`
pub async fn clear(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Cart>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_for_user(identity.user_id).await?;
    carts.clear(cart.id).await?;

    let cart = carts.get_for_user(identity.user_id).await?;
    Ok(ApiResponse::success(cart))
}
