//! Catalog listing and bulk sync from the external inventory system.

use thiserror::Error;

use crate::models::{Product, ProductSync};
use crate::store::{Store, StoreError};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A sync row carries a negative price.
    #[error("negative price for {external_id}")]
    NegativePrice {
        /// Offending external id.
        external_id: String,
    },

    /// A sync row carries a negative stock count.
    #[error("negative stock for {external_id}")]
    NegativeStock {
        /// Offending external id.
        external_id: String,
    },

    /// A sync row has an empty external id.
    #[error("external id must not be empty")]
    EmptyExternalId,

    /// Store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Catalog service.
pub struct CatalogService<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> CatalogService<'a, S> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All catalog products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Store` if the store query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products().await?)
    }

    /// Upsert catalog rows by external id.
    ///
    /// Rejects rows that violate the catalog invariants (`price >= 0`,
    /// `stock >= 0`) before any store access; within the store the batch
    /// is best-effort and a failing row does not abort the rest.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid rows, `CatalogError::Store`
    /// if the store fails outright.
    pub async fn sync(&self, items: &[ProductSync]) -> Result<u64, CatalogError> {
        for item in items {
            if item.external_id.trim().is_empty() {
                return Err(CatalogError::EmptyExternalId);
            }
            if item.price.is_negative() {
                return Err(CatalogError::NegativePrice {
                    external_id: item.external_id.clone(),
                });
            }
            if item.stock < 0 {
                return Err(CatalogError::NegativeStock {
                    external_id: item.external_id.clone(),
                });
            }
        }

        let count = self.store.sync_products(items).await?;
        tracing::info!(count, total = items.len(), "catalog sync applied");
        Ok(count)
    }
}
