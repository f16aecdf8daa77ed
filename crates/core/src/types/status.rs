//! Status enums for orders.
//!
//! An order carries two independent status axes: payment and fulfillment.
//! Payment status is driven by the payment provider (webhook) or an admin;
//! fulfillment status is driven by admins as the shipment progresses.
//! Transitions are not validated - the admin panel may move an order
//! backwards (e.g. delivered back to processing) to correct mistakes.

use serde::{Deserialize, Serialize};

/// Payment lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Order created, payment not yet confirmed.
    #[default]
    Pending,
    /// Payment confirmed by the provider.
    Paid,
    /// Payment attempt failed.
    Failed,
}

/// Shipping lifecycle of an order, independent of payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "fulfillment_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    /// Order accepted and queued for shipment.
    #[default]
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}
