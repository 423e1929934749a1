//! In-memory implementation of the storage port.
//!
//! Used by unit and integration tests, and as a datastore-free mode for
//! local development. A single async mutex guards all state, which makes
//! every operation naturally serialized and atomic: `place_order` takes a
//! snapshot of the product table and restores it on failure, so partial
//! decrements can never leak out, matching the Postgres adapter's
//! transaction semantics exactly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use fresh_basket_core::{OneTimeCode, OrderId, OrderStatus, Phone, ProductId, UserId};

use super::{Store, StoreError};
use crate::models::order::build_line_items;
use crate::models::{ItemRequest, Order, Product, ProductSync, User};

/// In-memory store.
///
/// Cheaply cloneable; clones share the same state, so a test can keep a
/// handle for inspection while the router owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    products: BTreeMap<ProductId, Product>,
    external_index: HashMap<String, ProductId>,
    users: BTreeMap<UserId, User>,
    phone_index: HashMap<String, UserId>,
    codes: HashMap<UserId, CodeRecord>,
    tokens: HashMap<String, UserId>,
    orders: Vec<Order>,
    next_product: i32,
    next_user: i32,
    next_order: i32,
}

struct CodeRecord {
    code: OneTimeCode,
    issued_at: DateTime<Utc>,
    consumed: bool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest code issued for `phone`, if any.
    ///
    /// Test hook standing in for the out-of-band SMS channel.
    pub async fn issued_code(&self, phone: &Phone) -> Option<OneTimeCode> {
        let inner = self.inner.lock().await;
        let user_id = inner.phone_index.get(phone.as_str())?;
        inner.codes.get(user_id).map(|r| r.code.clone())
    }

    /// Current stock for the product with the given external id.
    pub async fn stock_of(&self, external_id: &str) -> Option<i32> {
        let inner = self.inner.lock().await;
        let id = inner.external_index.get(external_id)?;
        inner.products.get(id).map(|p| p.stock)
    }

    /// Internal product id for the given external id.
    pub async fn product_id_of(&self, external_id: &str) -> Option<ProductId> {
        let inner = self.inner.lock().await;
        inner.external_index.get(external_id).copied()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.products.values().cloned().collect())
    }

    async fn sync_products(&self, items: &[ProductSync]) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        for item in items {
            if let Some(id) = inner.external_index.get(&item.external_id).copied() {
                if let Some(product) = inner.products.get_mut(&id) {
                    product.name.clone_from(&item.name);
                    product.price = item.price;
                    product.stock = item.stock;
                }
            } else {
                inner.next_product += 1;
                let id = ProductId::new(inner.next_product);
                inner.external_index.insert(item.external_id.clone(), id);
                inner.products.insert(
                    id,
                    Product {
                        id,
                        external_id: item.external_id.clone(),
                        name: item.name.clone(),
                        price: item.price,
                        stock: item.stock,
                    },
                );
            }
        }
        Ok(items.len() as u64)
    }

    async fn begin_login(
        &self,
        phone: &Phone,
        code: &OneTimeCode,
        issued_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;

        let user_id = match inner.phone_index.get(phone.as_str()).copied() {
            Some(id) => id,
            None => {
                inner.next_user += 1;
                let id = UserId::new(inner.next_user);
                inner.phone_index.insert(phone.as_str().to_owned(), id);
                inner.users.insert(
                    id,
                    User {
                        id,
                        phone: phone.clone(),
                        name: None,
                        address: None,
                        created_at: issued_at,
                    },
                );
                id
            }
        };

        inner.codes.insert(
            user_id,
            CodeRecord {
                code: code.clone(),
                issued_at,
                consumed: false,
            },
        );

        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::DataCorruption("user vanished during login".to_owned()))
    }

    async fn consume_login_code(
        &self,
        phone: &Phone,
        code: &OneTimeCode,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;

        let user_id = inner
            .phone_index
            .get(phone.as_str())
            .copied()
            .ok_or(StoreError::InvalidCode)?;
        let record = inner.codes.get_mut(&user_id).ok_or(StoreError::InvalidCode)?;

        if record.consumed || record.code != *code {
            return Err(StoreError::InvalidCode);
        }
        if now - record.issued_at > ttl {
            return Err(StoreError::CodeExpired);
        }
        record.consumed = true;

        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::DataCorruption("user vanished during login".to_owned()))
    }

    async fn insert_token(
        &self,
        user_id: UserId,
        token: &str,
        _issued_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.tokens.insert(token.to_owned(), user_id);
        Ok(())
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tokens
            .get(token)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn place_order(
        &self,
        user_id: UserId,
        address: &str,
        items: &[ItemRequest],
    ) -> Result<Order, StoreError> {
        let mut inner = self.inner.lock().await;

        // Snapshot for rollback; restored on any per-item failure.
        let snapshot = inner.products.clone();
        let mut resolved = Vec::with_capacity(items.len());

        for item in items {
            let Some(product) = inner.products.get_mut(&item.id) else {
                inner.products.clone_from(&snapshot);
                return Err(StoreError::ProductNotFound(item.id));
            };

            if i64::from(product.stock) < i64::from(item.quantity) {
                let err = StoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                };
                inner.products.clone_from(&snapshot);
                return Err(err);
            }

            product.stock -= i32::try_from(item.quantity).unwrap_or(i32::MAX);
            resolved.push((product.clone(), item.quantity));
        }

        let (total_price, order_items) = build_line_items(resolved.iter().map(|(p, q)| (p, *q)));

        inner.next_order += 1;
        let order = Order {
            id: OrderId::new(inner.next_order),
            user_id,
            created_at: Utc::now(),
            address: address.to_owned(),
            total_price,
            status: OrderStatus::Pending,
            items: order_items,
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.lock().await;
        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fresh_basket_core::Price;
    use rust_decimal::Decimal;

    fn sync_item(external_id: &str, name: &str, price: i64, stock: i32) -> ProductSync {
        ProductSync {
            external_id: external_id.to_owned(),
            name: name.to_owned(),
            price: Price::new(Decimal::from(price)),
            stock,
        }
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let store = MemoryStore::new();
        let items = vec![sync_item("k1", "Kefir", 75, 15)];

        assert_eq!(store.sync_products(&items).await.unwrap(), 1);
        assert_eq!(store.sync_products(&items).await.unwrap(), 1);

        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().external_id, "k1");
    }

    #[tokio::test]
    async fn test_sync_overwrites_unconditionally() {
        let store = MemoryStore::new();
        store
            .sync_products(&[sync_item("m1", "Milk", 89, 10)])
            .await
            .unwrap();
        store
            .sync_products(&[sync_item("m1", "Milk Select", 95, 3)])
            .await
            .unwrap();

        let products = store.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        let product = products.first().unwrap();
        assert_eq!(product.name, "Milk Select");
        assert_eq!(product.stock, 3);
        assert_eq!(product.price.to_string(), "95.00");
    }

    #[tokio::test]
    async fn test_place_order_decrements_and_snapshots() {
        let store = MemoryStore::new();
        store
            .sync_products(&[sync_item("m1", "Milk", 89, 10)])
            .await
            .unwrap();
        let id = store.product_id_of("m1").await.unwrap();

        let order = store
            .place_order(
                UserId::new(1),
                "Addr 1",
                &[ItemRequest { id, quantity: 3 }],
            )
            .await
            .unwrap();

        assert_eq!(order.total_price.to_string(), "267.00");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(store.stock_of("m1").await, Some(7));
    }

    #[tokio::test]
    async fn test_place_order_rolls_back_on_later_failure() {
        let store = MemoryStore::new();
        store
            .sync_products(&[sync_item("m1", "Milk", 89, 10)])
            .await
            .unwrap();
        let id = store.product_id_of("m1").await.unwrap();

        let result = store
            .place_order(
                UserId::new(1),
                "Addr 1",
                &[
                    ItemRequest { id, quantity: 3 },
                    ItemRequest {
                        id: ProductId::new(999),
                        quantity: 1,
                    },
                ],
            )
            .await;

        assert!(matches!(result, Err(StoreError::ProductNotFound(_))));
        // First item's decrement must not stick.
        assert_eq!(store.stock_of("m1").await, Some(10));
        assert!(store.orders_for_user(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_line_items_cannot_oversell() {
        let store = MemoryStore::new();
        store
            .sync_products(&[sync_item("m1", "Milk", 89, 10)])
            .await
            .unwrap();
        let id = store.product_id_of("m1").await.unwrap();

        let result = store
            .place_order(
                UserId::new(1),
                "Addr 1",
                &[
                    ItemRequest { id, quantity: 6 },
                    ItemRequest { id, quantity: 6 },
                ],
            )
            .await;

        assert!(matches!(
            result,
            Err(StoreError::InsufficientStock { available: 4, .. })
        ));
        assert_eq!(store.stock_of("m1").await, Some(10));
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let store = MemoryStore::new();
        let phone = Phone::parse("+77001234567").unwrap();
        let code = OneTimeCode::parse("1234").unwrap();
        let now = Utc::now();

        store.begin_login(&phone, &code, now).await.unwrap();
        store
            .consume_login_code(&phone, &code, now, Duration::seconds(300))
            .await
            .unwrap();

        let second = store
            .consume_login_code(&phone, &code, now, Duration::seconds(300))
            .await;
        assert!(matches!(second, Err(StoreError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_expired_code_rejected() {
        let store = MemoryStore::new();
        let phone = Phone::parse("+77001234567").unwrap();
        let code = OneTimeCode::parse("1234").unwrap();
        let issued = Utc::now() - Duration::seconds(600);

        store.begin_login(&phone, &code, issued).await.unwrap();
        let result = store
            .consume_login_code(&phone, &code, Utc::now(), Duration::seconds(300))
            .await;
        assert!(matches!(result, Err(StoreError::CodeExpired)));
    }
}
