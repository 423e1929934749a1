//! Order placement and order history.
//!
//! Turns a `(user, address, requested line items)` triple into a
//! persisted order. Input validation happens here, before any store
//! access; stock validation and the decrement happen inside the store's
//! single order transaction so concurrent requests for the same product
//! cannot oversell.

use std::time::Duration;

use thiserror::Error;

use fresh_basket_core::ProductId;

use crate::models::{ItemRequest, Order, User};
use crate::store::{Store, StoreError};

/// Errors that can occur while placing or listing orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The requested item list is empty.
    #[error("order must contain at least one item")]
    EmptyItems,

    /// The delivery address is empty or whitespace.
    #[error("delivery address must not be empty")]
    EmptyAddress,

    /// A requested quantity is not a positive integer.
    #[error("quantity must be a positive integer")]
    ZeroQuantity,

    /// A referenced product id does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds the units on hand.
    #[error("not enough stock for {name} ({available} left)")]
    InsufficientStock {
        /// Product name, for the client-facing message.
        name: String,
        /// Units remaining.
        available: i32,
    },

    /// The order transaction exceeded its time bound and was rolled back.
    #[error("order placement timed out")]
    Timeout,

    /// Store failure. The transaction rolled back; the request is safe
    /// to resubmit.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ProductNotFound(id) => Self::ProductNotFound(id),
            StoreError::InsufficientStock { name, available } => {
                Self::InsufficientStock { name, available }
            }
            other => Self::Store(other),
        }
    }
}

/// Order service.
pub struct OrderService<'a, S> {
    store: &'a S,
    timeout: Duration,
}

impl<'a, S: Store> OrderService<'a, S> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a S, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Place an order for `user`.
    ///
    /// The whole multi-item operation is one transaction: if any item
    /// fails validation, no stock decremented for earlier items remains
    /// decremented and no order row is created.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any store access for empty
    /// input, `ProductNotFound`/`InsufficientStock` naming the offending
    /// product, or `Timeout` if the transaction exceeded its bound.
    pub async fn create_order(
        &self,
        user: &User,
        address: &str,
        items: &[ItemRequest],
    ) -> Result<Order, OrderError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(OrderError::EmptyAddress);
        }
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        if items.iter().any(|item| item.quantity == 0) {
            return Err(OrderError::ZeroQuantity);
        }

        let placed = tokio::time::timeout(
            self.timeout,
            self.store.place_order(user.id, address, items),
        )
        .await
        .map_err(|_| OrderError::Timeout)?;

        let order = placed.map_err(OrderError::from)?;
        tracing::info!(
            order_id = %order.id,
            user_id = %user.id,
            total = %order.total_price,
            lines = order.items.len(),
            "order placed"
        );
        Ok(order)
    }

    /// All orders owned by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Store` if the store query fails.
    pub async fn history(&self, user: &User) -> Result<Vec<Order>, OrderError> {
        self.store
            .orders_for_user(user.id)
            .await
            .map_err(OrderError::from)
    }
}
