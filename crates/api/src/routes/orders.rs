//! Order routes. All of them require bearer auth.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{ItemRequest, Order};
use crate::services::OrderService;
use crate::state::AppState;
use crate::store::Store;

/// Request body for `POST /api/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub address: String,
    pub items: Vec<ItemRequest>,
}

/// Place an order for the authenticated user.
///
/// POST /api/orders
///
/// The whole order commits or nothing does; a failed line item leaves
/// stock untouched.
///
/// # Errors
///
/// Returns `AppError` for invalid input, an unknown product, or a line
/// item exceeding the units on hand.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let orders = OrderService::new(state.store(), state.config().order_timeout);
    let order = orders.create_order(&user, &body.address, &body.items).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// The authenticated user's order history, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// Returns `AppError` if the store query fails.
pub async fn index<S: Store>(
    State(state): State<AppState<S>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.store(), state.config().order_timeout);
    Ok(Json(orders.history(&user).await?))
}
