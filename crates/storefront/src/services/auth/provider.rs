//! Identity provider API client.
//!
//! Claim names (`admin`, `moderator`) are a provider-side detail and stay
//! inside this module; the rest of the codebase works with [`Role`].

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use nightbloom_core::Role;

use crate::config::AuthProviderConfig;

use super::{AuthError, CurrentUser};

/// Client for the identity provider's server-side API.
#[derive(Clone)]
pub struct AuthProviderClient {
    client: reqwest::Client,
    base_url: String,
    service_key: SecretString,
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
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

impl AuthProviderClient {
    /// Create a provider client.
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
    /// Returns `AuthError::InvalidToken` if the provider rejects the token,
    /// other variants for transport and parse failures.
    pub async fn verify_token(&self, token: &str) -> Result<CurrentUser, AuthError> {
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
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let identity: IdentityResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        Ok(CurrentUser {
            uid: identity.uid.into(),
            email: identity.email,
            role: role_from_claims(identity.claims.admin, identity.claims.moderator),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_claims() {
        assert_eq!(role_from_claims(false, false), Role::User);
        assert_eq!(role_from_claims(false, true), Role::Moderator);
        assert_eq!(role_from_claims(true, false), Role::Admin);
        // Both claims set reads as admin.
        assert_eq!(role_from_claims(true, true), Role::Admin);
    }
}
