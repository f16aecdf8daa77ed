//! Checkout orchestration.
//!
//! Ties the cart, the order ledger, and the payment provider together:
//! direct order placement, hosted-session creation, and the webhook
//! confirmation path.

use sqlx::PgPool;
use thiserror::Error;

use clementine_core::{CartId, PaymentStatus, UserId};

use crate::db::orders::OrderError;
use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::models::{Order, OrderItemRequest, ShippingAddress};
use crate::services::payment::{
    CheckoutSession, PaymentClient, PaymentError, SessionLineItem, SessionMetadata, to_cents,
};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// Order creation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Payment provider failure.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout orchestration service.
pub struct CheckoutService<'a> {
    carts: CartRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order directly from requested lines.
    ///
    /// Payment starts out pending. The user's cart is cleared on
    /// success, matching the storefront flow where the cart fed the
    /// order form.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Order` when a line cannot be fulfilled.
    pub async fn place_order(
        &self,
        user_id: UserId,
        items: &[OrderItemRequest],
        shipping_address: Option<&ShippingAddress>,
    ) -> Result<Order, CheckoutError> {
        let order = self
            .orders
            .create(user_id, items, shipping_address, PaymentStatus::Pending, None)
            .await?;

        let cart = self.carts.get_for_user(user_id).await?;
        self.carts.clear(cart.id).await?;

        Ok(order)
    }

    /// Create a hosted checkout session for the user's current cart.
    ///
    /// Line amounts are sent in cents. The session metadata carries the
    /// user and cart IDs so the webhook can resolve the cart later.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when there is nothing to buy
    /// and `CheckoutError::Payment` on provider failure.
    pub async fn begin_checkout(
        &self,
        user_id: UserId,
        payment: &PaymentClient,
        base_url: &str,
    ) -> Result<CheckoutSession, CheckoutError> {
        let cart = self.carts.get_for_user(user_id).await?;
        if cart.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut line_items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            line_items.push(SessionLineItem {
                name: line.product.name.clone(),
                amount_cents: to_cents(line.product.price)?,
                quantity: line.quantity,
            });
        }

        let session = payment
            .create_checkout_session(
                &line_items,
                SessionMetadata {
                    user_id,
                    cart_id: cart.id,
                },
                &format!("{base_url}/checkout/success"),
                &format!("{base_url}/cart"),
            )
            .await?;

        Ok(session)
    }

    /// Handle a confirmed payment for the given cart.
    ///
    /// Creates a paid order from the cart's current lines and clears
    /// the cart. Returns `None` without side effects when there is
    /// nothing to do: the cart is gone or already empty, or the payment
    /// reference was recorded by an earlier delivery of the same event.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Order` when a line cannot be fulfilled.
    pub async fn on_payment_confirmed(
        &self,
        cart_id: CartId,
        payment_ref: &str,
    ) -> Result<Option<Order>, CheckoutError> {
        let cart = match self.carts.get_by_id(cart_id).await {
            Ok(cart) => cart,
            Err(RepositoryError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if cart.items.is_empty() {
            return Ok(None);
        }

        let lines: Vec<OrderItemRequest> = cart
            .items
            .iter()
            .map(|line| OrderItemRequest {
                product_id: line.product.id,
                quantity: line.quantity,
            })
            .collect();

        let order = match self
            .orders
            .create(
                cart.user_id,
                &lines,
                None,
                PaymentStatus::Paid,
                Some(payment_ref),
            )
            .await
        {
            Ok(order) => order,
            Err(OrderError::DuplicatePaymentRef) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        self.carts.clear(cart.id).await?;

        Ok(Some(order))
    }
}
