//! Authentication against the external identity provider.
//!
//! The provider owns accounts, passwords and custom claims. The storefront
//! only ever sees a verified token: the browser signs in with the provider
//! directly, posts the resulting token here, and gets a server session.

mod provider;

pub use provider::{AuthProviderClient, role_from_claims};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nightbloom_core::{Role, Uid};

/// The authenticated shopper carried in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub uid: Uid,
    pub email: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this user may use the back office at all.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Errors from identity provider operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token failed verification.
    #[error("invalid token")]
    InvalidToken,

    /// The server session no longer maps to a provider account.
    #[error("session expired")]
    SessionExpired,

    /// No provider account for the given email.
    #[error("no account for {0}")]
    UserNotFound(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}
