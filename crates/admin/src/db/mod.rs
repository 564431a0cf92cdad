//! Database operations for the back office.
//!
//! Shares the `store` schema with the storefront binary; migrations live
//! with the storefront crate and run via the CLI.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod categories;
pub mod orders;
pub mod products;
pub mod requests;
pub mod roles;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be converted into a domain type.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// The requested row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),
}

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
