//! Courier rate client and delivery fee rules.
//!
//! Quotes come from the courier's rate API when one is configured; without
//! one, or when the API misbehaves, fees fall back to a fixed prefix table.
//! Delivery never blocks a sale on a rate lookup.

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::dec;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use nightbloom_core::Price;

use crate::config::ShippingConfig;

/// Flat delivery fee charged when no cheaper zone matches.
pub const DEFAULT_DELIVERY_FEE: Price = Price::new(dec!(69));

/// Postal codes are six digits, no separators.
pub const POSTAL_CODE_LENGTH: usize = 6;

/// Errors that can occur when interacting with the rate API.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Courier rate API client with a built-in fallback table.
#[derive(Clone)]
pub struct ShippingClient {
    api: Option<RateApi>,
}

#[derive(Clone)]
struct RateApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RateResponse {
    fee: rust_decimal::Decimal,
}

impl ShippingClient {
    /// Create a rate client. With no configuration, all quotes come from
    /// the local prefix table.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: Option<&ShippingConfig>) -> Result<Self, ShippingError> {
        let Some(config) = config else {
            return Ok(Self { api: None });
        };

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|e| ShippingError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            api: Some(RateApi {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Quote the delivery fee for a destination postal code.
    ///
    /// The caller must pass a validated postal code. Rate API failures are
    /// logged and answered from the fallback table.
    pub async fn quote(&self, postal_code: &str) -> Price {
        let Some(api) = &self.api else {
            return fallback_quote(postal_code);
        };

        match api.fetch_rate(postal_code).await {
            Ok(fee) => fee,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    postal_code,
                    "Rate API lookup failed, using fallback table"
                );
                fallback_quote(postal_code)
            }
        }
    }
}

impl RateApi {
    async fn fetch_rate(&self, postal_code: &str) -> Result<Price, ShippingError> {
        let url = format!("{}/rates?destination={postal_code}", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ShippingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let rate: RateResponse = response
            .json()
            .await
            .map_err(|e| ShippingError::Parse(e.to_string()))?;

        Ok(Price::new(rate.fee))
    }
}

/// Whether a destination code is exactly six ASCII digits.
#[must_use]
pub fn is_valid_postal_code(code: &str) -> bool {
    code.len() == POSTAL_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Fixed prefix table: metro zones ship cheap, everywhere else pays the
/// flat fee.
#[must_use]
pub fn fallback_quote(postal_code: &str) -> Price {
    if postal_code.starts_with("10") {
        Price::new(dec!(5))
    } else if postal_code.starts_with("20") {
        Price::new(dec!(7))
    } else {
        DEFAULT_DELIVERY_FEE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_validation() {
        assert!(is_valid_postal_code("100001"));
        assert!(is_valid_postal_code("000000"));
        assert!(!is_valid_postal_code("10001"));
        assert!(!is_valid_postal_code("1000011"));
        assert!(!is_valid_postal_code("10000a"));
        assert!(!is_valid_postal_code("10 001"));
        assert!(!is_valid_postal_code(""));
    }

    #[test]
    fn test_fallback_quote_zones() {
        assert_eq!(fallback_quote("100001"), Price::new(dec!(5)));
        assert_eq!(fallback_quote("203040"), Price::new(dec!(7)));
        assert_eq!(fallback_quote("560001"), Price::new(dec!(69)));
    }

    #[tokio::test]
    async fn test_quote_without_api_uses_fallback() {
        let client = ShippingClient::new(None).unwrap();
        assert_eq!(client.quote("100001").await, Price::new(dec!(5)));
        assert_eq!(client.quote("999999").await, DEFAULT_DELIVERY_FEE);
    }
}
