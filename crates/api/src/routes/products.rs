//! Catalog route handlers. Reads are public; writes require admin.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use clementine_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Stock adjustment request body.
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    /// Signed change in units; the result floors at zero.
    pub delta: i32,
}

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 1000;

fn validate_text(name: Option<&str>, description: Option<&str>) -> Result<()> {
    if name.is_some_and(|n| n.trim().is_empty() || n.len() > MAX_NAME_LENGTH) {
        return Err(AppError::BadRequest(format!(
            "name must be 1 to {MAX_NAME_LENGTH} characters"
        )));
    }
    if description.is_some_and(|d| d.len() > MAX_DESCRIPTION_LENGTH) {
        return Err(AppError::BadRequest(format!(
            "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<ApiResponse<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(ApiResponse::success(products))
}

/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool()).get(id).await?;
    Ok(ApiResponse::success(product))
}

/// `POST /products` (admin)
pub async fn create(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> Result<ApiResponse<Product>> {
    validate_text(Some(&body.name), Some(&body.description))?;
    if body.price < rust_decimal::Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".to_owned()));
    }
    if body.stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).create(&body).await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok(ApiResponse::success(product))
}

/// `PUT /products/{id}` (admin)
pub async fn update(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<ApiResponse<Product>> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_owned()));
    }
    validate_text(patch.name.as_deref(), patch.description.as_deref())?;
    if patch.price.is_some_and(|p| p < rust_decimal::Decimal::ZERO) {
        return Err(AppError::BadRequest("price must not be negative".to_owned()));
    }
    if patch.stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock must not be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).update(id, &patch).await?;
    Ok(ApiResponse::success(product))
}

/// `DELETE /products/{id}` (admin)
///
/// Deletion is permissive: existing order snapshots keep their copied
/// data and any cart lines for the product are dropped.
pub async fn delete(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ApiResponse<()>> {
    ProductRepository::new(state.pool()).delete(id).await?;

    tracing::info!(product_id = %id, "Product deleted");

    Ok(ApiResponse::success(()))
}

/// `POST /products/{id}/stock` (admin)
pub async fn adjust_stock(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<StockAdjustment>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool())
        .adjust_stock(id, body.delta)
        .await?;
    Ok(ApiResponse::success(product))
}
