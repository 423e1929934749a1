//! Catalog routes.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use fresh_basket_core::Price;

use crate::error::Result;
use crate::models::{Product, ProductSync};
use crate::services::CatalogService;
use crate::state::AppState;
use crate::store::Store;

/// One row of the inventory feed. `id` is the feed's own identifier and
/// is stored as the product's external id.
#[derive(Debug, Deserialize)]
pub struct SyncItem {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub stock: i32,
}

/// Response from a sync run.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    /// Rows actually applied.
    pub count: u64,
}

/// List the catalog.
///
/// GET /api/products
///
/// # Errors
///
/// Returns `AppError` if the store query fails.
pub async fn index<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Vec<Product>>> {
    let catalog = CatalogService::new(state.store());
    Ok(Json(catalog.list().await?))
}

/// Apply an inventory feed to the catalog, upserting by external id.
///
/// POST /api/products/sync
///
/// The body is the feed itself: a bare array of rows.
///
/// # Errors
///
/// Returns `AppError` for rows with a negative price or stock, or if the
/// store fails.
pub async fn sync<S: Store>(
    State(state): State<AppState<S>>,
    Json(body): Json<Vec<SyncItem>>,
) -> Result<Json<SyncResponse>> {
    let items: Vec<ProductSync> = body
        .into_iter()
        .map(|item| ProductSync {
            external_id: item.id,
            name: item.name,
            price: item.price,
            stock: item.stock,
        })
        .collect();

    let catalog = CatalogService::new(state.store());
    let count = catalog.sync(&items).await?;
    Ok(Json(SyncResponse {
        success: true,
        count,
    }))
}
