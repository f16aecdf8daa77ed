//! Cart domain types.

use serde::{Deserialize, Serialize};

use clementine_core::{CartId, UserId};

use super::Product;

/// A user's cart with live product details resolved.
///
/// Lines whose product has since been deleted from the catalog are
/// omitted (the join no longer resolves them).
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
}

/// One cart line: a live product reference plus a quantity >= 1.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i32,
}

/// How a cart mutation interprets its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    /// Add the quantity to any existing line (the default).
    #[default]
    Increment,
    /// Replace the line's quantity outright.
    Set,
    /// Drop the line regardless of quantity.
    Remove,
}
