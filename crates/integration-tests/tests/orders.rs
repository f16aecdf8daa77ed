//! Integration tests for order placement, ownership, and status updates.
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use clementine_integration_tests::{
    base_url, create_product, fixture_pool, register_admin, register_user,
};

async fn product_stock(client: &Client, id: i64) -> i64 {
    let resp = client
        .get(format!("{}/products/{id}", base_url()))
        .send()
        .await
        .expect("Failed to get product");
    let body: Value = resp.json().await.expect("Failed to parse product");
    body["data"]["stock"].as_i64().expect("missing stock")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_total_and_stock_decrement() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;

    let a = create_product(&client, &admin.token, "Order A", "10.00", 8).await;
    let b = create_product(&client, &admin.token, "Order B", "5.00", 8).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "items": [
                {"product_id": a, "quantity": 2},
                {"product_id": b, "quantity": 1},
            ],
            "shipping_address": {
                "street": "1 Test Way",
                "city": "Testville",
                "state": "TS",
                "zip_code": "00001",
                "country": "Testland",
            },
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::OK);
    let order: Value = resp.json().await.expect("Failed to parse order");

    assert_eq!(order["data"]["total"], json!("25.00"));
    assert_eq!(order["data"]["payment_status"], json!("pending"));
    assert_eq!(order["data"]["fulfillment_status"], json!("processing"));
    assert_eq!(order["data"]["items"].as_array().expect("array").len(), 2);

    assert_eq!(product_stock(&client, a).await, 6);
    assert_eq!(product_stock(&client, b).await, 7);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_insufficient_stock_rolls_back_whole_order() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;

    let plenty = create_product(&client, &admin.token, "Plenty", "1.00", 50).await;
    let scarce = create_product(&client, &admin.token, "Scarce", "1.00", 1).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({
            "items": [
                {"product_id": plenty, "quantity": 10},
                {"product_id": scarce, "quantity": 5},
            ],
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Nothing was decremented, not even the fulfillable line.
    assert_eq!(product_stock(&client, plenty).await, 50);
    assert_eq!(product_stock(&client, scarce).await, 1);

    // And no order was recorded.
    let resp = client
        .get(format!("{}/orders", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to list orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert!(orders["data"].as_array().expect("array").is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_empty_order_rejected() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({"items": []}))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_non_owner_cannot_read_order() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let owner = register_user(&client).await;
    let stranger = register_user(&client).await;

    let id = create_product(&client, &admin.token, "Private", "9.99", 5).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&owner.token)
        .json(&json!({"items": [{"product_id": id, "quantity": 1}]}))
        .send()
        .await
        .expect("Failed to place order");
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["data"]["id"].as_i64().expect("missing order id");

    let resp = client
        .get(format!("{}/orders/{order_id}", base_url()))
        .bearer_auth(&stranger.token)
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The admin can read it, with buyer details on the listing.
    let resp = client
        .get(format!("{}/orders/{order_id}", base_url()))
        .bearer_auth(&admin.token)
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_status_updates_are_independent_and_unvalidated() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;

    let id = create_product(&client, &admin.token, "Shippable", "4.00", 5).await;
    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({"items": [{"product_id": id, "quantity": 1}]}))
        .send()
        .await
        .expect("Failed to place order");
    let order: Value = resp.json().await.expect("Failed to parse order");
    let order_id = order["data"]["id"].as_i64().expect("missing order id");

    // Only fulfillment changes; payment stays pending.
    let resp = client
        .put(format!("{}/orders/{order_id}", base_url()))
        .bearer_auth(&admin.token)
        .json(&json!({"fulfillment_status": "delivered"}))
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["data"]["fulfillment_status"], json!("delivered"));
    assert_eq!(body["data"]["payment_status"], json!("pending"));

    // Backwards move is accepted.
    let resp = client
        .put(format!("{}/orders/{order_id}", base_url()))
        .bearer_auth(&admin.token)
        .json(&json!({"fulfillment_status": "processing"}))
        .send()
        .await
        .expect("Failed to update status");
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["data"]["fulfillment_status"], json!("processing"));

    // Non-admins cannot touch statuses.
    let resp = client
        .put(format!("{}/orders/{order_id}", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({"fulfillment_status": "shipped"}))
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
