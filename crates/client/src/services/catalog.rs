//! Cached product catalog lookups.
//!
//! The catalog is read-only and priced at add-time, so short-lived caching
//! is safe: a cart line keeps the price it was added at regardless of what
//! the catalog says later.

use std::time::Duration;

use moka::future::Cache;

use green_basket_core::ProductId;

use crate::error::OrderingError;
use crate::models::Product;
use crate::store::Catalog;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Product lookup with an in-memory read cache.
///
/// Negative lookups (unknown products) are not cached.
#[derive(Debug, Clone)]
pub struct CatalogService<C: Catalog> {
    catalog: C,
    cache: Cache<ProductId, Product>,
}

impl<C: Catalog> CatalogService<C> {
    /// Create a catalog service over a catalog capability.
    #[must_use]
    pub fn new(catalog: C) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { catalog, cache }
    }

    /// Look up a product, serving repeat reads from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::RemoteUnavailable`] if the catalog cannot be
    /// read.
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, OrderingError> {
        if let Some(hit) = self.cache.get(&id).await {
            return Ok(Some(hit));
        }
        match self.catalog.product(id).await? {
            Some(product) => {
                self.cache.insert(id, product.clone()).await;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }
}
