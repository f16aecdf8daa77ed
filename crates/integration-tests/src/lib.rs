//! Shared helpers for Clementine integration tests.
//!
//! Tests talk to a running API server over HTTP and reach into the
//! database directly only for fixtures the API deliberately does not
//! expose (promoting a user to admin).
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the API server, then:
//! cargo test -p clementine-integration-tests -- --ignored
//! ```

use reqwest::Client;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Webhook signing secret; must match the server's configuration.
#[must_use]
pub fn webhook_secret() -> String {
    std::env::var("PAYMENT_WEBHOOK_SECRET")
        .unwrap_or_else(|_| "whsec_integration_test_secret".to_string())
}

/// Connect directly to the database for test fixtures.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is unset or the connection fails.
pub async fn fixture_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A registered account plus its bearer token.
pub struct TestUser {
    pub email: String,
    pub token: String,
    pub user_id: i64,
}

/// Register a fresh user with a unique email and return it with a token.
///
/// # Panics
///
/// Panics on any non-success response.
pub async fn register_user(client: &Client) -> TestUser {
    let email = format!("test-{}@example.com", Uuid::new_v4());
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "integration-pass-1",
        }))
        .send()
        .await
        .expect("Failed to register test user");
    assert!(resp.status().is_success(), "register failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse register response");
    TestUser {
        email,
        token: body["data"]["token"]
            .as_str()
            .expect("register response missing token")
            .to_string(),
        user_id: body["data"]["user"]["id"]
            .as_i64()
            .expect("register response missing user id"),
    }
}

/// Register a user and promote them to admin via the database, then
/// log in again so the token carries the admin role.
///
/// # Panics
///
/// Panics on any failed step.
pub async fn register_admin(client: &Client, pool: &PgPool) -> TestUser {
    let user = register_user(client).await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE email = $1")
        .bind(&user.email)
        .execute(pool)
        .await
        .expect("Failed to promote test user to admin");

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "email": user.email,
            "password": "integration-pass-1",
            "role": "admin",
        }))
        .send()
        .await
        .expect("Failed to log in as admin");
    assert!(resp.status().is_success(), "admin login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse login response");
    TestUser {
        email: user.email,
        token: body["data"]["token"]
            .as_str()
            .expect("login response missing token")
            .to_string(),
        user_id: user.user_id,
    }
}

/// Create a product via the admin API, returning its id.
///
/// # Panics
///
/// Panics on any non-success response.
pub async fn create_product(
    client: &Client,
    admin_token: &str,
    name: &str,
    price: &str,
    stock: i32,
) -> i64 {
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(admin_token)
        .json(&json!({
            "name": name,
            "description": "integration test product",
            "price": price,
            "category": "test",
            "stock": stock,
            "image": "https://example.com/p.png",
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert!(resp.status().is_success(), "product create failed: {}", resp.status());

    let body: Value = resp.json().await.expect("Failed to parse product response");
    body["data"]["id"].as_i64().expect("product response missing id")
}

/// Sign a webhook payload the way the payment provider does.
#[must_use]
pub fn sign_webhook(secret: &str, timestamp: u64, body: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(body);
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}

/// Current unix timestamp.
///
/// # Panics
///
/// Panics if the system clock is before the unix epoch.
#[must_use]
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs()
}
