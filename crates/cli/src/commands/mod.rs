//! CLI command implementations.

pub mod migrate;
pub mod role;
pub mod seed;

use thiserror::Error;

/// Errors shared across CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid command argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Resolve the database URL from the environment.
///
/// Prefers `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`;
/// both binaries share one database.
pub fn database_url() -> Result<String, CommandError> {
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))
}
