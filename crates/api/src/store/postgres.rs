//! `PostgreSQL` implementation of the storage port.
//!
//! Queries are runtime-checked (`query_as` + `FromRow` row structs) so
//! the crate builds without a live database. Row structs stay private to
//! this adapter; everything crossing the module boundary is a domain
//! type.
//!
//! # Concurrency
//!
//! `place_order` serializes the stock-check-and-decrement per product
//! row: `SELECT ... FOR UPDATE` takes a row lock inside the order
//! transaction, and the decrement itself is conditional
//! (`... AND stock >= $qty`) with an affected-row check. Two concurrent
//! orders against the same product therefore cannot jointly oversell,
//! and the `stock >= 0` CHECK constraint never trips.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use fresh_basket_core::{OneTimeCode, OrderId, OrderStatus, Phone, ProductId, UserId};

use super::{Store, StoreError};
use crate::models::order::build_line_items;
use crate::models::{ItemRequest, Order, OrderItem, Product, ProductSync, User};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, external_id, name, price, stock FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRow::into_domain).collect())
    }

    async fn sync_products(&self, items: &[ProductSync]) -> Result<u64, StoreError> {
        let mut count = 0_u64;
        for item in items {
            let result = sqlx::query(
                r"
                INSERT INTO products (external_id, name, price, stock)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (external_id) DO UPDATE
                SET name = EXCLUDED.name,
                    price = EXCLUDED.price,
                    stock = EXCLUDED.stock
                ",
            )
            .bind(&item.external_id)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.stock)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => count += 1,
                Err(e) => {
                    tracing::warn!(
                        external_id = %item.external_id,
                        error = %e,
                        "catalog sync row failed, skipping"
                    );
                }
            }
        }
        Ok(count)
    }

    async fn begin_login(
        &self,
        phone: &Phone,
        code: &OneTimeCode,
        issued_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (phone)
            VALUES ($1)
            ON CONFLICT (phone) DO UPDATE SET phone = EXCLUDED.phone
            RETURNING id, phone, name, address, created_at
            ",
        )
        .bind(phone)
        .fetch_one(&mut *tx)
        .await?
        .into_domain();

        sqlx::query("INSERT INTO login_codes (user_id, code, issued_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(code)
            .bind(issued_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn consume_login_code(
        &self,
        phone: &Phone,
        code: &OneTimeCode,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, phone, name, address, created_at FROM users WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(&mut *tx)
        .await?
        .map(UserRow::into_domain)
        .ok_or(StoreError::InvalidCode)?;

        // Only the latest code counts; older ones are superseded.
        let latest = sqlx::query_as::<_, LoginCodeRow>(
            r"
            SELECT id, code, issued_at, consumed
            FROM login_codes
            WHERE user_id = $1
            ORDER BY issued_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::InvalidCode)?;

        if latest.consumed || latest.code != *code {
            return Err(StoreError::InvalidCode);
        }
        if now - latest.issued_at > ttl {
            return Err(StoreError::CodeExpired);
        }

        // Affected-row check guards against a concurrent double-verify.
        let updated =
            sqlx::query("UPDATE login_codes SET consumed = TRUE WHERE id = $1 AND NOT consumed")
                .bind(latest.id)
                .execute(&mut *tx)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::InvalidCode);
        }

        tx.commit().await?;
        Ok(user)
    }

    async fn insert_token(
        &self,
        user_id: UserId,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO auth_tokens (token, user_id, issued_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(issued_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.phone, u.name, u.address, u.created_at
            FROM users u
            JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_domain))
    }

    async fn place_order(
        &self,
        user_id: UserId,
        address: &str,
        items: &[ItemRequest],
    ) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut resolved = Vec::with_capacity(items.len());

        for item in items {
            // Row lock: concurrent orders for the same product wait here.
            let product = sqlx::query_as::<_, ProductRow>(
                "SELECT id, external_id, name, price, stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(item.id)
            .fetch_optional(&mut *tx)
            .await?
            .map(ProductRow::into_domain)
            .ok_or(StoreError::ProductNotFound(item.id))?;

            if i64::from(product.stock) < i64::from(item.quantity) {
                // Dropping the transaction rolls back earlier decrements.
                return Err(StoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                });
            }

            let quantity = i32::try_from(item.quantity).unwrap_or(i32::MAX);
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1",
            )
            .bind(quantity)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(StoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                });
            }

            resolved.push((product, item.quantity));
        }

        let (total_price, order_items) =
            build_line_items(resolved.iter().map(|(p, q)| (p, *q)));

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, address, total_price, status, items)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, address, total_price, status, items, created_at
            ",
        )
        .bind(user_id)
        .bind(address)
        .bind(total_price)
        .bind(OrderStatus::Pending.as_str())
        .bind(Json(&order_items))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_domain()
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, address, total_price, status, items, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }
}

// =============================================================================
// Row types (internal to the adapter)
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    external_id: String,
    name: String,
    price: fresh_basket_core::Price,
    stock: i32,
}

impl ProductRow {
    fn into_domain(self) -> Product {
        Product {
            id: self.id,
            external_id: self.external_id,
            name: self.name,
            price: self.price,
            stock: self.stock,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    phone: Phone,
    name: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> User {
        User {
            id: self.id,
            phone: self.phone,
            name: self.name,
            address: self.address,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoginCodeRow {
    id: fresh_basket_core::LoginCodeId,
    code: OneTimeCode,
    issued_at: DateTime<Utc>,
    consumed: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    address: String,
    total_price: fresh_basket_core::Price,
    status: String,
    items: Json<Vec<OrderItem>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_domain(self) -> Result<Order, StoreError> {
        let status = OrderStatus::from_str(&self.status).map_err(StoreError::DataCorruption)?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            created_at: self.created_at,
            address: self.address,
            total_price: self.total_price,
            status,
            items: self.items.0,
        })
    }
}
