//! Order route handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use clementine_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, OrderItemRequest, OrderStatusPatch, ShippingAddress};
use crate::response::ApiResponse;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Direct order creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: Option<ShippingAddress>,
}

/// `GET /orders`
///
/// Admins get every order with buyer details; everyone else gets only
/// their own.
pub async fn list(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool());
    let orders = if identity.is_admin() {
        orders.list_all().await?
    } else {
        orders.list_for_user(identity.user_id).await?
    };
    Ok(ApiResponse::success(orders))
}

/// `POST /orders`
pub async fn create(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<ApiResponse<Order>> {
    let order = CheckoutService::new(state.pool())
        .place_order(
            identity.user_id,
            &body.items,
            body.shipping_address.as_ref(),
        )
        .await?;

    tracing::info!(order_id = %order.id, user_id = %identity.user_id, "Order placed");

    Ok(ApiResponse::success(order))
}

/// `GET /orders/{id}`
pub async fn show(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<ApiResponse<Order>> {
    let order = OrderRepository::new(state.pool()).get(id).await?;

    if order.user_id != identity.user_id && !identity.is_admin() {
        return Err(AppError::Forbidden("not your order".to_owned()));
    }

    Ok(ApiResponse::success(order))
}

/// `PUT /orders/{id}` (admin)
///
/// Either status axis may be set independently. Transitions are not
/// validated; an order can move backwards.
pub async fn update_status(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(patch): Json<OrderStatusPatch>,
) -> Result<ApiResponse<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, &patch)
        .await?;
    Ok(ApiResponse::success(order))
}
