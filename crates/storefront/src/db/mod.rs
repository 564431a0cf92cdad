//! Database operations for the storefront `PostgreSQL`.
//!
//! # Database: `nightbloom`
//!
//! The storefront and back office share one database. This crate owns the
//! schema; migrations live in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p nightbloom-cli -- migrate
//! ```
//!
//! ## Tables
//!
//! - `products` / `product_variants` - Catalog with per-size stock
//! - `categories` - Curated product groupings
//! - `carts` / `cart_items` - One cart per shopper, one row per (product, size)
//! - `orders` / `order_items` - Immutable purchase snapshots
//! - `product_requests` - Shopper wishlist submissions
//! - `admins` - Staff role membership (mirrors provider claims)
//! - `sessions` - Tower-sessions storage

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod requests;

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
