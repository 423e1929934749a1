//! Storage port for the storefront backend.
//!
//! The core consumes a product-lookup/stock-mutation interface and a user
//! identity interface; this module is that seam. Two adapters implement
//! it: [`postgres::PgStore`] for production and [`memory::MemoryStore`]
//! for tests and datastore-free development.
//!
//! Every adapter must uphold the same contract for `place_order`: the
//! stock check and decrement are one logical step per product, the whole
//! multi-item order is atomic, and a failure leaves no partial decrement
//! behind.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use fresh_basket_core::{OneTimeCode, Phone, ProductId, UserId};

use crate::models::{ItemRequest, Order, Product, ProductSync, User};

pub use memory::MemoryStore;
pub use postgres::{PgStore, create_pool};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A requested product id does not exist.
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

    /// The login code does not match, was already consumed, or was
    /// superseded by a newer code.
    #[error("invalid login code")]
    InvalidCode,

    /// The login code fell outside its validity window.
    #[error("login code expired")]
    CodeExpired,
}

/// Storage operations the services depend on.
///
/// Adapters own their transaction semantics; callers never see a
/// half-applied order.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// All catalog products.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Upsert catalog rows by external id, last-writer-wins.
    ///
    /// Best-effort: a failing row is logged and skipped, the batch
    /// continues. Returns the number of rows applied.
    async fn sync_products(&self, items: &[ProductSync]) -> Result<u64, StoreError>;

    /// Upsert the user for `phone` and record a fresh login code.
    async fn begin_login(
        &self,
        phone: &Phone,
        code: &OneTimeCode,
        issued_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    /// Verify and consume the latest login code for `phone`.
    ///
    /// A code verifies at most once; a second attempt with the same code
    /// fails with [`StoreError::InvalidCode`]. Codes older than `ttl`
    /// fail with [`StoreError::CodeExpired`].
    async fn consume_login_code(
        &self,
        phone: &Phone,
        code: &OneTimeCode,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<User, StoreError>;

    /// Persist a bearer token for a verified user.
    async fn insert_token(
        &self,
        user_id: UserId,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Resolve a bearer token to its user, if the token exists.
    async fn user_for_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Place an order: validate stock, decrement it, and persist the
    /// order snapshot as one atomic unit.
    ///
    /// Items are processed in request order; the first failure aborts
    /// the whole order and rolls back every earlier decrement.
    async fn place_order(
        &self,
        user_id: UserId,
        address: &str,
        items: &[ItemRequest],
    ) -> Result<Order, StoreError>;

    /// All orders owned by `user_id`, newest first. Side-effect free.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}
