//! Identity provider admin API client.
//!
//! The provider owns accounts and role claims. This client is the only
//! place that speaks the claim vocabulary (`admin`, `moderator`); the
//! rest of the crate deals in [`Role`].

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use nightbloom_core::{Role, Uid};

use crate::config::AuthProviderConfig;

/// Maximum accounts fetched per user listing.
const LIST_USERS_LIMIT: u32 = 1000;

/// Errors from identity provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The token failed verification.
    #[error("invalid token")]
    InvalidToken,

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

/// A provider account with its resolved role.
#[derive(Debug, Clone)]
pub struct ProviderUser {
    pub uid: Uid,
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    uid: String,
    email: Option<String>,
    #[serde(default)]
    claims: Claims,
}

#[derive(Debug, Default, Deserialize)]
struct Claims {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    moderator: bool,
}

#[derive(Debug, Deserialize)]
struct AccountListResponse {
    users: Vec<AccountResponse>,
}

/// Map provider claims onto a role. Admin wins over moderator.
#[must_use]
pub const fn role_from_claims(admin: bool, moderator: bool) -> Role {
    if admin {
        Role::Admin
    } else if moderator {
        Role::Moderator
    } else {
        Role::User
    }
}

/// Claims payload for a role, in the provider's vocabulary.
fn claims_for_role(role: Role) -> serde_json::Value {
    match role {
        Role::Admin => serde_json::json!({ "admin": true }),
        Role::Moderator => serde_json::json!({ "moderator": true }),
        Role::User => serde_json::json!({}),
    }
}

impl From<AccountResponse> for ProviderUser {
    fn from(account: AccountResponse) -> Self {
        Self {
            uid: account.uid.into(),
            email: account.email,
            role: role_from_claims(account.claims.admin, account.claims.moderator),
        }
    }
}

/// Client for the identity provider's privileged admin API.
#[derive(Clone)]
pub struct ProviderAdminClient {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
}

impl ProviderAdminClient {
    /// Create a provider admin client.
    #[must_use]
    pub fn new(config: &AuthProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            service_key: config.service_key.clone(),
        }
    }

    /// Verify a browser-issued token and resolve the account behind it.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidToken` if the provider rejects the
    /// token, other variants for transport and parse failures.
    pub async fn verify_token(&self, token: &str) -> Result<ProviderUser, ProviderError> {
        let url = format!("{}/v1/tokens:verify", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.service_key.expose_secret())
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST
        {
            return Err(ProviderError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(account.into())
    }

    /// List provider accounts with their resolved roles.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn list_users(&self) -> Result<Vec<ProviderUser>, ProviderError> {
        let url = format!("{}/v1/users?limit={LIST_USERS_LIMIT}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: AccountListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(list.users.into_iter().map(ProviderUser::from).collect())
    }

    /// Find an account by email.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::UserNotFound` if no account matches.
    pub async fn find_by_email(&self, email: &str) -> Result<ProviderUser, ProviderError> {
        let url = format!("{}/v1/users:lookup", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.service_key.expose_secret())
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::UserNotFound(email.to_owned()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(account.into())
    }

    /// Replace an account's role claims. Setting [`Role::User`] clears
    /// any staff claims.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    pub async fn set_role(&self, uid: &Uid, role: Role) -> Result<(), ProviderError> {
        let url = format!("{}/v1/users/{}/claims", self.base_url, uid);

        let response = self
            .client
            .put(&url)
            .bearer_auth(self.service_key.expose_secret())
            .json(&claims_for_role(role))
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_claims() {
        assert_eq!(role_from_claims(false, false), Role::User);
        assert_eq!(role_from_claims(false, true), Role::Moderator);
        assert_eq!(role_from_claims(true, true), Role::Admin);
    }

    #[test]
    fn test_claims_for_role_are_exclusive() {
        assert_eq!(claims_for_role(Role::Admin), serde_json::json!({"admin": true}));
        assert_eq!(
            claims_for_role(Role::Moderator),
            serde_json::json!({"moderator": true})
        );
        assert_eq!(claims_for_role(Role::User), serde_json::json!({}));
    }

    #[test]
    fn test_account_response_defaults_claims() {
        let account: AccountResponse =
            serde_json::from_str(r#"{"uid": "u1", "email": "a@b.com"}"#).unwrap();
        let user = ProviderUser::from(account);
        assert_eq!(user.role, Role::User);
    }
}
