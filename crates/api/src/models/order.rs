//! Order domain types.
//!
//! An order is an immutable snapshot of what was bought: item names,
//! prices, and images are copied from the catalog at order time and
//! never re-joined against the live product. Only the two status
//! fields change after creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{FulfillmentStatus, OrderId, PaymentStatus, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Buyer name, populated on admin listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    /// Buyer email, populated on admin listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    pub items: Vec<OrderItem>,
    /// Sum of snapshot price x quantity over all lines.
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    /// External payment reference, set by the payment confirmation path.
    pub payment_ref: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Point-in-time snapshot of one purchased line.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Catalog ID at purchase time. Not a live reference - the product
    /// may have been deleted since.
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image: String,
}

/// Shipping destination captured at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// One requested line in a direct order-creation request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Admin patch for order statuses; either axis may be set independently.
/// Transitions are deliberately unvalidated (backwards moves are allowed).
#[derive(Debug, Default, Deserialize)]
pub struct OrderStatusPatch {
    pub payment_status: Option<PaymentStatus>,
    pub fulfillment_status: Option<FulfillmentStatus>,
}
