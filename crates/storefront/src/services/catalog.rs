//! Read-through product cache.
//!
//! Catalog reads vastly outnumber writes, so product listings are served
//! from a short-TTL in-memory cache in front of the repository. The TTL is
//! deliberately short: a stale availability figure is repaired by cart
//! reconciliation, and checkout re-reads stock inside its transaction.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use nightbloom_core::{Product, ProductId};

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;

/// Catalog cache TTL.
const CATALOG_TTL: Duration = Duration::from_secs(30);

/// In-memory read-through cache over the product repository.
#[derive(Clone)]
pub struct CatalogCache {
    pool: PgPool,
    cache: Cache<(), Arc<Vec<Product>>>,
}

impl CatalogCache {
    /// Create a cache bound to the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_TTL)
            .build();
        Self { pool, cache }
    }

    /// All products, newest first, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backing query fails.
    pub async fn all(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.cache.get(&()).await {
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.pool).list_all().await?);
        self.cache.insert((), Arc::clone(&products)).await;
        Ok(products)
    }

    /// Find one product in the cached listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backing query fails.
    pub async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.all().await?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    /// Find one product by slug in the cached listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backing query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let products = self.all().await?;
        Ok(products.iter().find(|p| p.slug == slug).cloned())
    }

    /// Drop the cached listing so the next read hits the database.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}
