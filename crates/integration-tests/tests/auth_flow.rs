//! End-to-end auth flow over the real router.

use axum::http::StatusCode;
use serde_json::json;

use fresh_basket_integration_tests::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_full_login_flow() {
    let app = TestApp::new();
    let token = app.login("+7 700 123 45 67").await;
    assert!(!token.is_empty());

    // The token gates the protected surface.
    let (status, body) = app.get("/api/orders", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_verify_returns_user_with_phone() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/auth/send-code", None, &json!({ "phone": "+77001234567" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let phone = fresh_basket_core::Phone::parse("+77001234567").unwrap();
    let code = app.store.issued_code(&phone).await.unwrap();

    let (status, body) = app
        .post(
            "/api/auth/verify",
            None,
            &json!({ "phone": "+77001234567", "code": code.as_str() }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["phone"], json!("+77001234567"));
    assert!(body["accessToken"].as_str().is_some());
}

#[tokio::test]
async fn test_code_reuse_is_unauthorized() {
    let app = TestApp::new();
    let (_, _) = app
        .post("/api/auth/send-code", None, &json!({ "phone": "+77001234567" }))
        .await;

    let phone = fresh_basket_core::Phone::parse("+77001234567").unwrap();
    let code = app.store.issued_code(&phone).await.unwrap();
    let verify = json!({ "phone": "+77001234567", "code": code.as_str() });

    let (first, _) = app.post("/api/auth/verify", None, &verify).await;
    assert_eq!(first, StatusCode::OK);

    let (second, body) = app.post("/api/auth/verify", None, &verify).await;
    assert_eq!(second, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_wrong_code_is_unauthorized() {
    let app = TestApp::new();
    app.post("/api/auth/send-code", None, &json!({ "phone": "+77001234567" }))
        .await;

    let phone = fresh_basket_core::Phone::parse("+77001234567").unwrap();
    let issued = app.store.issued_code(&phone).await.unwrap();
    // Any 4-digit value other than the issued one.
    let wrong = if issued.as_str() == "0000" { "0001" } else { "0000" };

    let (status, _) = app
        .post(
            "/api/auth/verify",
            None,
            &json!({ "phone": "+77001234567", "code": wrong }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_phone_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/auth/send-code", None, &json!({ "phone": "not a phone" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/orders", Some("feedfacecafebeef")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
