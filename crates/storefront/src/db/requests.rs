//! Product request repository.
//!
//! Shoppers can ask for a product or size the store does not stock yet;
//! the back office reads these as a lightweight demand signal.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nightbloom_core::{ProductRequestId, Uid};

use super::RepositoryError;

/// A shopper-submitted product request.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRequest {
    pub id: ProductRequestId,
    pub uid: Option<Uid>,
    pub email: Option<String>,
    pub product_name: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for product request operations.
pub struct ProductRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRequestRepository<'a> {
    /// Create a new product request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a request. Anonymous submissions carry no uid or email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        uid: Option<&Uid>,
        email: Option<&str>,
        product_name: &str,
        size: &str,
    ) -> Result<ProductRequestId, RepositoryError> {
        let row: (i32,) = sqlx::query_as(
            r"
            INSERT INTO store.product_requests (uid, email, product_name, size)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(uid.map(Uid::as_str))
        .bind(email)
        .bind(product_name)
        .bind(size)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductRequestId::new(row.0))
    }

    /// List all requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ProductRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRequest>(
            r"
            SELECT id, uid, email, product_name, size, created_at
            FROM store.product_requests
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
