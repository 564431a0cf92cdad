//! Product request listing for the back office.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nightbloom_core::{ProductRequestId, Uid};

use super::RepositoryError;

/// A shopper-submitted restock request.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub id: ProductRequestId,
    pub uid: Option<Uid>,
    pub email: Option<String>,
    pub product_name: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for reading product requests.
pub struct ProductRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRequestRepository<'a> {
    /// Create a new product request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
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
