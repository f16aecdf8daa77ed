//! Integration tests for registration, login, and identity resolution.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - The API server running (cargo run -p clementine-api)
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use clementine_integration_tests::{base_url, fixture_pool, register_admin, register_user};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_then_me_resolves_same_identity() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({"email": user.email, "password": "integration-pass-1"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse login body");
    assert_eq!(body["success"], json!(true));
    let token = body["data"]["token"].as_str().expect("missing token");

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse me body");
    assert_eq!(body["data"]["email"], json!(user.email));
    assert_eq!(body["data"]["role"], json!("user"));
    assert_eq!(body["data"]["id"], json!(user.user_id));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_is_case_insensitive_on_email() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "email": user.email.to_uppercase(),
            "password": "integration-pass-1",
        }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_wrong_password_rejected() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({"email": user.email, "password": "not-the-password"}))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_registration_conflicts() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "name": "Someone Else",
            "email": user.email,
            "password": "integration-pass-2",
        }))
        .send()
        .await
        .expect("Failed to send register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_short_password_rejected() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "name": "Shorty",
            "email": "shorty@example.com",
            "password": "short",
        }))
        .send()
        .await
        .expect("Failed to send register");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_role_pinned_login_rejects_mismatch() {
    let client = Client::new();
    let user = register_user(&client).await;

    // A plain user asking for the admin surface gets 403.
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "email": user.email,
            "password": "integration-pass-1",
            "role": "admin",
        }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_login_without_role_rejected() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;

    // Omitting the role defaults to the customer surface, which an
    // admin account does not match.
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({"email": admin.email, "password": "integration-pass-1"}))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_login_and_me() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth(&admin.token)
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["data"]["role"], json!("admin"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_me_without_token_unauthorized() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth("garbage-token")
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
