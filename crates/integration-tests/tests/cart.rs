//! Integration tests for cart mutations.
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use clementine_integration_tests::{base_url, create_product, fixture_pool, register_admin, register_user};

async fn mutate_cart(client: &Client, token: &str, body: &Value) -> Value {
    let resp = client
        .post(format!("{}/cart", base_url()))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .expect("Failed to mutate cart");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.expect("Failed to parse cart")
}

fn line_quantity(cart: &Value, product_id: i64) -> Option<i64> {
    cart["data"]["items"]
        .as_array()
        .expect("items should be an array")
        .iter()
        .find(|line| line["product"]["id"].as_i64() == Some(product_id))
        .map(|line| line["quantity"].as_i64().expect("missing quantity"))
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_starts_empty_and_is_created_lazily() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .get(format!("{}/cart", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert!(cart["data"]["items"].as_array().expect("array").is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_increment_set_remove_lifecycle() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let id = create_product(&client, &admin.token, "Cartable", "2.00", 100).await;

    // Default action is increment with quantity 1.
    let cart = mutate_cart(&client, &user.token, &json!({"product_id": id})).await;
    assert_eq!(line_quantity(&cart, id), Some(1));

    // Adding again accumulates.
    let cart = mutate_cart(
        &client,
        &user.token,
        &json!({"product_id": id, "quantity": 2}),
    )
    .await;
    assert_eq!(line_quantity(&cart, id), Some(3));

    // Set replaces outright.
    let cart = mutate_cart(
        &client,
        &user.token,
        &json!({"product_id": id, "quantity": 5, "action": "set"}),
    )
    .await;
    assert_eq!(line_quantity(&cart, id), Some(5));

    // Remove drops the line.
    let cart = mutate_cart(
        &client,
        &user.token,
        &json!({"product_id": id, "action": "remove"}),
    )
    .await;
    assert_eq!(line_quantity(&cart, id), None);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_quantity_at_or_below_zero_drops_line() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let id = create_product(&client, &admin.token, "Droppable", "2.00", 100).await;

    let cart = mutate_cart(
        &client,
        &user.token,
        &json!({"product_id": id, "quantity": 3}),
    )
    .await;
    assert_eq!(line_quantity(&cart, id), Some(3));

    // Set to zero removes.
    let cart = mutate_cart(
        &client,
        &user.token,
        &json!({"product_id": id, "quantity": 0, "action": "set"}),
    )
    .await;
    assert_eq!(line_quantity(&cart, id), None);

    // Increment below zero removes too.
    mutate_cart(&client, &user.token, &json!({"product_id": id, "quantity": 2})).await;
    let cart = mutate_cart(
        &client,
        &user.token,
        &json!({"product_id": id, "quantity": -5}),
    )
    .await;
    assert_eq!(line_quantity(&cart, id), None);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_product_is_not_found() {
    let client = Client::new();
    let user = register_user(&client).await;

    let resp = client
        .post(format!("{}/cart", base_url()))
        .bearer_auth(&user.token)
        .json(&json!({"product_id": 999_999_999}))
        .send()
        .await
        .expect("Failed to mutate cart");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_clear_cart() {
    let client = Client::new();
    let pool = fixture_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let id = create_product(&client, &admin.token, "Clearable", "2.00", 100).await;

    mutate_cart(&client, &user.token, &json!({"product_id": id, "quantity": 4})).await;

    let resp = client
        .delete(format!("{}/cart", base_url()))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert!(cart["data"]["items"].as_array().expect("array").is_empty());
}
