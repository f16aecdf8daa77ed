//! Order repository.
//!
//! Order creation is a single transaction: every line's stock is
//! decremented with a conditional update, the snapshot rows are
//! written, and any failure rolls the whole thing back. Stock is never
//! left partially decremented and two concurrent orders cannot both
//! take the last unit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use clementine_core::{FulfillmentStatus, OrderId, PaymentStatus, ProductId, UserId};

use crate::models::{Order, OrderItem, OrderItemRequest, OrderStatusPatch, ShippingAddress};

use super::RepositoryError;

/// Errors specific to order creation.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// A requested product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A requested quantity exceeds the units on hand.
    #[error("insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// The request carried no lines at all.
    #[error("order has no items")]
    Empty,

    /// A requested quantity was zero or negative.
    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    /// The payment reference was already recorded on another order.
    #[error("payment reference already processed")]
    DuplicatePaymentRef,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository backed by the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from the requested lines, decrementing stock.
    ///
    /// Name, price, and image are snapshotted from the catalog at this
    /// moment. The conditional stock decrement doubles as the oversell
    /// guard: if another transaction took the units first, this one
    /// fails and rolls back in full.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Empty` for an empty request,
    /// `OrderError::ProductNotFound` / `InsufficientStock` /
    /// `InvalidQuantity` per line, and `DuplicatePaymentRef` when the
    /// payment reference was already recorded.
    pub async fn create(
        &self,
        user_id: UserId,
        lines: &[OrderItemRequest],
        shipping_address: Option<&ShippingAddress>,
        payment_status: PaymentStatus,
        payment_ref: Option<&str>,
    ) -> Result<Order, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::Empty);
        }

        let mut tx = self.pool.begin().await?;

        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in lines {
            let item = take_stock(&mut tx, line).await?;
            total += item.price * Decimal::from(item.quantity);
            items.push(item);
        }

        let shipping_json = shipping_address
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        let header = sqlx::query_as::<_, OrderHeader>(
            "INSERT INTO orders (user_id, total, payment_status, fulfillment_status, payment_ref, shipping_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, user_id, total, payment_status, fulfillment_status,
                       payment_ref, shipping_address, created_at, updated_at",
        )
        .bind(user_id)
        .bind(total)
        .bind(payment_status)
        .bind(FulfillmentStatus::default())
        .bind(payment_ref)
        .bind(shipping_json)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                OrderError::DuplicatePaymentRef
            }
            _ => OrderError::from(e),
        })?;

        for item in &items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, price, quantity, image)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(header.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.quantity)
            .bind(&item.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(header.into_order(items)?)
    }

    /// List every order with buyer name and email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeader>(
            "SELECT o.id, o.user_id, u.name AS buyer_name, u.email AS buyer_email,
                    o.total, o.payment_status, o.fulfillment_status,
                    o.payment_ref, o.shipping_address, o.created_at, o.updated_at
             FROM orders o
             JOIN users u ON u.id = o.user_id
             ORDER BY o.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        self.attach_items(headers).await
    }

    /// List one user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeader>(
            "SELECT id, user_id, total, payment_status, fulfillment_status,
                    payment_ref, shipping_address, created_at, updated_at
             FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        self.attach_items(headers).await
    }

    /// Fetch a single order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let header = sqlx::query_as::<_, OrderHeader>(
            "SELECT id, user_id, total, payment_status, fulfillment_status,
                    payment_ref, shipping_address, created_at, updated_at
             FROM orders
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT product_id, name, price, quantity, image
             FROM order_items
             WHERE order_id = $1
             ORDER BY product_id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(header.into_order(items)?)
    }

    /// Update either status axis; absent fields keep their value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        patch: &OrderStatusPatch,
    ) -> Result<Order, RepositoryError> {
        let updated = sqlx::query_scalar::<_, OrderId>(
            "UPDATE orders SET
                 payment_status = COALESCE($2, payment_status),
                 fulfillment_status = COALESCE($3, fulfillment_status),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(patch.payment_status)
        .bind(patch.fulfillment_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        self.get(updated).await
    }

    async fn attach_items(
        &self,
        headers: Vec<OrderHeader>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<OrderId> = headers.iter().map(|h| h.id).collect();
        let rows = sqlx::query_as::<_, GroupedItemRow>(
            "SELECT order_id, product_id, name, price, quantity, image
             FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id, product_id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            let items = rows
                .iter()
                .filter(|r| r.order_id == header.id)
                .map(|r| r.item.clone())
                .collect();
            orders.push(header.into_order(items)?);
        }
        Ok(orders)
    }
}

async fn take_stock(
    tx: &mut Transaction<'_, Postgres>,
    line: &OrderItemRequest,
) -> Result<OrderItem, OrderError> {
    if line.quantity <= 0 {
        return Err(OrderError::InvalidQuantity(line.product_id));
    }

    let snapshot = sqlx::query_as::<_, StockSnapshot>(
        "UPDATE products
         SET stock = stock - $2, updated_at = NOW()
         WHERE id = $1 AND stock >= $2
         RETURNING name, price, image",
    )
    .bind(line.product_id)
    .bind(line.quantity)
    .fetch_optional(&mut **tx)
    .await?;

    match snapshot {
        Some(s) => Ok(OrderItem {
            product_id: line.product_id,
            name: s.name,
            price: s.price,
            quantity: line.quantity,
            image: s.image,
        }),
        // Distinguish a missing product from an out-of-stock one.
        None => {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                    .bind(line.product_id)
                    .fetch_one(&mut **tx)
                    .await?;
            if exists {
                Err(OrderError::InsufficientStock(line.product_id))
            } else {
                Err(OrderError::ProductNotFound(line.product_id))
            }
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderHeader {
    id: OrderId,
    user_id: UserId,
    #[sqlx(default)]
    buyer_name: Option<String>,
    #[sqlx(default)]
    buyer_email: Option<String>,
    total: Decimal,
    payment_status: PaymentStatus,
    fulfillment_status: FulfillmentStatus,
    payment_ref: Option<String>,
    shipping_address: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderHeader {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let shipping_address = self
            .shipping_address
            .map(serde_json::from_value::<ShippingAddress>)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("bad shipping address: {e}"))
            })?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            buyer_name: self.buyer_name,
            buyer_email: self.buyer_email,
            items,
            total: self.total,
            payment_status: self.payment_status,
            fulfillment_status: self.fulfillment_status,
            payment_ref: self.payment_ref,
            shipping_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GroupedItemRow {
    order_id: OrderId,
    #[sqlx(flatten)]
    item: OrderItem,
}

#[derive(sqlx::FromRow)]
struct StockSnapshot {
    name: String,
    price: Decimal,
    image: String,
}
