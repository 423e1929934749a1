//! End-to-end order placement over the real router.

use axum::http::StatusCode;
use serde_json::json;

use fresh_basket_integration_tests::TestApp;

async fn seeded_app() -> TestApp {
    let app = TestApp::new();
    app.seed_products(&json!([
        { "id": "m1", "name": "Milk", "price": "89.00", "stock": 10 },
        { "id": "b1", "name": "Bread", "price": "4.50", "stock": 5 },
    ]))
    .await;
    app
}

async fn product_id(app: &TestApp, external_id: &str) -> i32 {
    app.store
        .product_id_of(external_id)
        .await
        .expect("seeded product should exist")
        .as_i32()
}

#[tokio::test]
async fn test_orders_require_bearer_token() {
    let app = seeded_app().await;

    let (status, _) = app.get("/api/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/orders",
            None,
            &json!({ "address": "Abay 1", "items": [{ "id": 1, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_place_order_end_to_end() {
    let app = seeded_app().await;
    let token = app.login("+77001234567").await;
    let milk = product_id(&app, "m1").await;
    let bread = product_id(&app, "b1").await;

    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({
                "address": "Abay 1",
                "items": [
                    { "id": milk, "quantity": 3 },
                    { "id": bread, "quantity": 2 },
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    // 3 * 89.00 + 2 * 4.50, exact to two decimal places
    assert_eq!(body["totalPrice"], json!("276.00"));
    assert_eq!(body["status"], json!("pending"));
    assert_eq!(body["address"], json!("Abay 1"));
    assert_eq!(body["items"][0]["name"], json!("Milk"));
    assert_eq!(body["items"][0]["price"], json!("89.00"));
    assert_eq!(body["items"][0]["quantity"], json!(3));

    assert_eq!(app.store.stock_of("m1").await, Some(7));
    assert_eq!(app.store.stock_of("b1").await, Some(3));

    // The catalog now advertises the decremented stock.
    let (status, products) = app.get("/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let milk_row = products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["externalId"] == json!("m1"))
        .unwrap();
    assert_eq!(milk_row["stock"], json!(7));
}

#[tokio::test]
async fn test_insufficient_stock_is_conflict_and_atomic() {
    let app = seeded_app().await;
    let token = app.login("+77001234567").await;
    let milk = product_id(&app, "m1").await;
    let bread = product_id(&app, "b1").await;

    // First line fits, second does not; neither may commit.
    let (status, body) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({
                "address": "Abay 1",
                "items": [
                    { "id": milk, "quantity": 2 },
                    { "id": bread, "quantity": 6 },
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Bread"));
    assert_eq!(app.store.stock_of("m1").await, Some(10));
    assert_eq!(app.store.stock_of("b1").await, Some(5));

    let (_, history) = app.get("/api/orders", Some(&token)).await;
    assert_eq!(history, json!([]));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let app = seeded_app().await;
    let token = app.login("+77001234567").await;

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({ "address": "Abay 1", "items": [{ "id": 999, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let app = seeded_app().await;
    let token = app.login("+77001234567").await;
    let milk = product_id(&app, "m1").await;

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({ "address": "Abay 1", "items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({ "address": "   ", "items": [{ "id": milk, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({ "address": "Abay 1", "items": [{ "id": milk, "quantity": 0 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Negative quantities die at deserialization.
    let (status, _) = app
        .post(
            "/api/orders",
            Some(&token),
            &json!({ "address": "Abay 1", "items": [{ "id": milk, "quantity": -2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_history_is_newest_first_and_private() {
    let app = seeded_app().await;
    let first = app.login("+77001111111").await;
    let second = app.login("+77002222222").await;
    let milk = product_id(&app, "m1").await;

    for _ in 0..2 {
        let (status, _) = app
            .post(
                "/api/orders",
                Some(&first),
                &json!({ "address": "Abay 1", "items": [{ "id": milk, "quantity": 1 }] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, mine) = app.get("/api/orders", Some(&first)).await;
    let mine = mine.as_array().unwrap().clone();
    assert_eq!(mine.len(), 2);
    assert!(mine[0]["id"].as_i64().unwrap() > mine[1]["id"].as_i64().unwrap());

    // The other account sees none of them.
    let (_, theirs) = app.get("/api/orders", Some(&second)).await;
    assert_eq!(theirs, json!([]));
}

#[tokio::test]
async fn test_concurrent_orders_cannot_oversell() {
    let app = seeded_app().await;
    let token = app.login("+77001234567").await;
    let milk = product_id(&app, "m1").await;

    let body = json!({ "address": "Abay 1", "items": [{ "id": milk, "quantity": 6 }] });
    let (a, b) = tokio::join!(
        app.post("/api/orders", Some(&token), &body),
        app.post("/api/orders", Some(&token), &body),
    );

    let statuses = [a.0, b.0];
    assert!(statuses.contains(&StatusCode::CREATED));
    assert!(statuses.contains(&StatusCode::CONFLICT));
    assert_eq!(app.store.stock_of("m1").await, Some(4));
}
