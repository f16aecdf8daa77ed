//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (pings the database)
//!
//! # Auth
//! POST   /auth/register         - Create an account, returns user + token
//! POST   /auth/login            - Verify credentials, returns user + token
//! GET    /auth/me               - Resolve the bearer token to a user
//!
//! # Products
//! GET    /products              - List/filter the catalog (public)
//! POST   /products              - Create a product (admin)
//! GET    /products/{id}         - Product detail (public)
//! PUT    /products/{id}         - Partial update (admin)
//! DELETE /products/{id}         - Delete (admin)
//! POST   /products/{id}/stock   - Adjust stock by a signed delta (admin)
//!
//! # Cart
//! GET    /cart                  - Resolved cart, created lazily
//! POST   /cart                  - Add/set/remove one line
//! DELETE /cart                  - Clear all lines
//!
//! # Orders
//! GET    /orders                - Own orders; admins see everyone's
//! POST   /orders                - Place an order directly
//! GET    /orders/{id}           - One order (owner or admin)
//! PUT    /orders/{id}           - Update status fields (admin)
//!
//! # Payment
//! POST   /payment/create-session - Hosted checkout session for the cart
//! POST   /payment/webhook        - Provider event delivery (signature auth)
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod payment;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/stock", post(products::adjust_stock))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/", get(cart::show).post(cart::mutate).delete(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::show).put(orders::update_status))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-session", post(payment::create_session))
        .route("/webhook", post(payment::webhook))
}

/// Liveness check.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness check; verifies the database answers.
pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
