//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::ProductId;

/// A catalog product.
///
/// Stock is mutated by admin updates, stock adjustments, and order
/// creation; everything else only changes through admin patches.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name (max 100 chars).
    pub name: String,
    /// Product description (max 1000 chars).
    pub description: String,
    /// Unit price, never negative.
    pub price: Decimal,
    /// Category label used for exact-match filtering.
    pub category: String,
    /// Units on hand, never negative.
    pub stock: i32,
    /// Primary image reference.
    pub image: String,
    /// Optional gallery image references.
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a product. All are required except the gallery.
#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial patch for an existing product; absent fields are untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
}

impl ProductPatch {
    /// True when the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.image.is_none()
            && self.images.is_none()
    }
}

/// Catalog listing filter; all clauses are optional and conjunctive.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Inclusive price lower bound.
    pub min_price: Option<Decimal>,
    /// Inclusive price upper bound.
    pub max_price: Option<Decimal>,
}
