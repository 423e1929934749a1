//! Order domain types and the pricing rules shared by every store backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fresh_basket_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::product::Product;

/// A frozen line-item snapshot inside a placed order.
///
/// This is the bit-exact shape persisted per order and reproduced on
/// receipts: `{id, name, price, quantity}`. Name and price are copied at
/// order time; later catalog changes never alter a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product the snapshot was taken from.
    pub id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: Price,
    /// Units ordered.
    pub quantity: u32,
}

/// A requested line item: product reference plus quantity.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ItemRequest {
    /// Internal product id.
    pub id: ProductId,
    /// Units requested. Must be positive.
    pub quantity: u32,
}

/// A placed order (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// Set at creation, immutable.
    pub created_at: DateTime<Utc>,
    /// Delivery address copied at order time.
    pub address: String,
    /// Exact sum of `price x quantity` over `items`.
    pub total_price: Price,
    /// Delivery status, `pending` at creation.
    pub status: OrderStatus,
    /// Frozen line-item snapshots, in request order.
    pub items: Vec<OrderItem>,
}

/// Compute the order total and line-item snapshots for resolved products.
///
/// Arithmetic is exact two-digit decimal; summation order is the request
/// order, and repeated additions cannot drift.
#[must_use]
pub fn build_line_items<'a, I>(resolved: I) -> (Price, Vec<OrderItem>)
where
    I: IntoIterator<Item = (&'a Product, u32)>,
{
    let mut total = Price::ZERO;
    let mut items = Vec::new();
    for (product, quantity) in resolved {
        total = total + product.price.line_total(quantity);
        items.push(OrderItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
        });
    }
    (total, items)
}
