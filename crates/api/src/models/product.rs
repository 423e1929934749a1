//! Product domain types.

use serde::Serialize;

use fresh_basket_core::{Price, ProductId};

/// A catalog product (domain type).
///
/// `external_id` is the stable identifier assigned by the outside
/// inventory system and is the upsert key during catalog sync. `id` is
/// the internal surrogate key used in order requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Internal surrogate key.
    pub id: ProductId,
    /// Stable external identifier, unique.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Unit price, two fractional digits.
    pub price: Price,
    /// Units on hand. Never negative.
    pub stock: i32,
}

/// One incoming catalog sync row.
///
/// Matched against existing products by `external_id`; name, price, and
/// stock overwrite the stored row unconditionally (last-writer-wins).
#[derive(Debug, Clone)]
pub struct ProductSync {
    pub external_id: String,
    pub name: String,
    pub price: Price,
    pub stock: i32,
}
