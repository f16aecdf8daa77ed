//! Cart repository.
//!
//! Each user has at most one cart, created lazily on first access.
//! Lines are keyed by `(cart_id, product_id)` and always join against
//! the live catalog, so a deleted product simply vanishes from the
//! cart (the foreign key cascade removes its line).

use sqlx::PgPool;

use clementine_core::{CartId, ProductId, UserId};

use crate::models::{Cart, CartAction, CartLine, Product};

use super::RepositoryError;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository backed by the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's cart, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn get_for_user(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart_id = self.get_or_create(user_id).await?;
        let items = self.lines(cart_id).await?;
        Ok(Cart {
            id: cart_id,
            user_id,
            items,
        })
    }

    /// Fetch a cart by its ID, for payment confirmation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    pub async fn get_by_id(&self, cart_id: CartId) -> Result<Cart, RepositoryError> {
        let user_id = sqlx::query_scalar::<_, UserId>("SELECT user_id FROM carts WHERE id = $1")
            .bind(cart_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let items = self.lines(cart_id).await?;
        Ok(Cart {
            id: cart_id,
            user_id,
            items,
        })
    }

    /// Apply one mutation to a cart line.
    ///
    /// `Increment` adds to any existing quantity, `Set` replaces it, and
    /// `Remove` drops the line. Any resulting quantity at or below zero
    /// also drops the line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn apply(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        action: CartAction,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_items
             WHERE cart_id = $1 AND product_id = $2
             FOR UPDATE",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let new_quantity = match action {
            CartAction::Remove => 0,
            CartAction::Set => quantity,
            CartAction::Increment => current.unwrap_or(0).saturating_add(quantity),
        };

        if new_quantity <= 0 {
            sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                "INSERT INTO cart_items (cart_id, product_id, quantity)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (cart_id, product_id)
                 DO UPDATE SET quantity = EXCLUDED.quantity",
            )
            .bind(cart_id)
            .bind(product_id)
            .bind(new_quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Remove every line from a cart. The cart row itself survives.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn get_or_create(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        // The no-op update makes ON CONFLICT return the existing row.
        let cart_id = sqlx::query_scalar::<_, CartId>(
            "INSERT INTO carts (user_id)
             VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(cart_id)
    }

    async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT p.id, p.name, p.description, p.price, p.category, p.stock,
                    p.image, p.images, p.created_at, p.updated_at,
                    ci.quantity
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.cart_id = $1
             ORDER BY p.id",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CartLine {
                product: row.product,
                quantity: row.quantity,
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    product: Product,
    quantity: i32,
}
