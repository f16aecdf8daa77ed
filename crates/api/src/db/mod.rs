//! Database operations for the Clementine `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts and password hashes
//! - `products` - The live catalog (price, stock, category)
//! - `carts` / `cart_items` - One mutable cart per user
//! - `orders` / `order_items` - Append-only purchase snapshots
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run automatically on
//! startup via `sqlx::migrate!`.
//!
//! All queries are runtime-checked (`sqlx::query` / `query_as`) so the
//! crate builds without a live database.

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
