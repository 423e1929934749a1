//! In-process end-to-end tests for the Fresh Basket API.
//!
//! Drives the real router over the in-memory store, so the tests cover
//! everything from HTTP decoding down to the storage contract without a
//! running database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fresh-basket-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use fresh_basket_api::config::AppConfig;
use fresh_basket_api::routes;
use fresh_basket_api::state::AppState;
use fresh_basket_api::store::MemoryStore;
use fresh_basket_core::Phone;

/// The API assembled over the in-memory store, plus direct access to
/// that store for seeding and inspection.
pub struct TestApp {
    router: Router,
    /// The store behind the router. Clones share state.
    pub store: MemoryStore,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh application with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let config = AppConfig {
            database_url: SecretString::from("postgres://unused"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            code_ttl: Duration::from_secs(300),
            order_timeout: Duration::from_secs(10),
        };
        let store = MemoryStore::new();
        let router = routes::router(AppState::new(config, store.clone()));
        Self { router, store }
    }

    /// Send one request through the router and decode the response.
    ///
    /// Returns the status plus the body parsed as JSON (or as a JSON
    /// string for non-JSON bodies such as the health check).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the response body cannot
    /// be read; both indicate a broken test, not a broken server.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should be infallible");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();

        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// GET without a body.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    /// POST a JSON body.
    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    /// Seed the catalog through the sync endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the sync request is rejected.
    pub async fn seed_products(&self, items: &Value) {
        let (status, body) = self.post("/api/products/sync", None, items).await;
        assert_eq!(status, StatusCode::OK, "seed failed: {body}");
    }

    /// Run the full login flow for `phone` and return a bearer token.
    ///
    /// Reads the issued code straight from the store, standing in for
    /// the SMS delivery the tests have no access to.
    ///
    /// # Panics
    ///
    /// Panics if any step of the flow fails.
    pub async fn login(&self, phone: &str) -> String {
        let (status, _) = self
            .post(
                "/api/auth/send-code",
                None,
                &serde_json::json!({ "phone": phone }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let parsed = Phone::parse(phone).expect("test phone should parse");
        let code = self
            .store
            .issued_code(&parsed)
            .await
            .expect("a code should have been issued");

        let (status, body) = self
            .post(
                "/api/auth/verify",
                None,
                &serde_json::json!({ "phone": phone, "code": code.as_str() }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {body}");

        body["accessToken"]
            .as_str()
            .expect("session should carry a token")
            .to_owned()
    }
}
