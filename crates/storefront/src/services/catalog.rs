//! Catalog service.
//!
//! Serves the product catalog from a `moka` cache in front of the products
//! endpoint, and shapes category listings into display rows.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::data::{DataError, ProductSource};
use crate::models::{Product, ProductCatalog};

/// Default time a fetched catalog is served before refetching.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(300);

/// Number of stars in a rating display.
pub const STAR_COUNT: usize = 5;

const CATALOG_KEY: &str = "catalog";

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The products endpoint failed.
    #[error("catalog unavailable: {0}")]
    Data(#[from] DataError),

    /// No category with this name.
    #[error("category not found: {0}")]
    NotFound(String),

    /// Rows must hold at least one product.
    #[error("columns must be at least 1")]
    InvalidColumns,
}

/// Cached access to the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    source: Arc<dyn ProductSource>,
    cache: Cache<String, Arc<ProductCatalog>>,
}

impl CatalogService {
    /// Create a service caching `source` for `ttl`.
    #[must_use]
    pub fn new(source: Arc<dyn ProductSource>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { source, cache }
    }

    /// The whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Data` if the catalog is not cached and the
    /// fetch fails.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Arc<ProductCatalog>, CatalogError> {
        if let Some(catalog) = self.cache.get(CATALOG_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(catalog);
        }

        let catalog = Arc::new(self.source.fetch_products().await?);
        self.cache
            .insert(CATALOG_KEY.to_string(), Arc::clone(&catalog))
            .await;
        Ok(catalog)
    }

    /// Products in `name`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown category, or
    /// `CatalogError::Data` if the catalog cannot be fetched.
    pub async fn category(&self, name: &str) -> Result<Vec<Product>, CatalogError> {
        self.catalog()
            .await?
            .category(name)
            .map(<[Product]>::to_vec)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Products in `name` laid out in rows of `columns`.
    ///
    /// # Errors
    ///
    /// As [`Self::category`], plus `CatalogError::InvalidColumns` when
    /// `columns` is zero.
    pub async fn category_rows(
        &self,
        name: &str,
        columns: usize,
    ) -> Result<Vec<Vec<Product>>, CatalogError> {
        if columns == 0 {
            return Err(CatalogError::InvalidColumns);
        }
        chunk(self.category(name).await?, columns)
    }

    /// Drop the cached catalog so the next read refetches.
    pub async fn invalidate(&self) {
        self.cache.invalidate(CATALOG_KEY).await;
    }
}

/// Split `items` into rows of `size`; the last row may be shorter.
///
/// # Errors
///
/// Returns `CatalogError::InvalidColumns` if `size` is zero.
pub fn chunk<T: Clone>(items: Vec<T>, size: usize) -> Result<Vec<Vec<T>>, CatalogError> {
    if size == 0 {
        return Err(CatalogError::InvalidColumns);
    }
    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}

/// Filled state of each star for `rating`: star `i` is filled iff `i < rating`.
#[must_use]
pub fn stars(rating: f64) -> [bool; STAR_COUNT] {
    let mut filled = [false; STAR_COUNT];
    for (i, star) in (0_u32..).zip(filled.iter_mut()) {
        *star = f64::from(i) < rating;
    }
    filled
}
