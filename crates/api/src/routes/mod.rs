//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health              - Health check
//!
//! # Catalog
//! GET  /api/products        - Product listing
//! POST /api/products/sync   - Upsert catalog rows from the inventory feed
//!
//! # Auth
//! POST /api/auth/send-code  - Issue a one-time login code
//! POST /api/auth/verify     - Verify a code, mint a bearer token
//!
//! # Orders (requires bearer auth)
//! POST /api/orders          - Place an order
//! GET  /api/orders          - Order history, newest first
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::store::Store;

/// Create the auth routes router.
pub fn auth_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/send-code", post(auth::send_code))
        .route("/verify", post(auth::verify))
}

/// Create the product routes router.
pub fn product_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(products::index))
        .route("/sync", post(products::sync))
}

/// Create the order routes router.
pub fn order_routes<S: Store>() -> Router<AppState<S>> {
    Router::new().route("/", post(orders::create).get(orders::index))
}

/// Assemble the full application router.
pub fn router<S: Store>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
