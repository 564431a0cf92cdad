//! Image CDN upload client.
//!
//! The back office accepts product images as base64 data URLs from the
//! browser, validates and decodes them server-side, and forwards the
//! bytes to the CDN under a generated public ID. Only the returned CDN
//! URL is stored.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MediaConfig;

/// Upload size cap, after decoding. The CDN enforces its own limit but
/// rejecting early keeps oversized payloads off the wire.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Errors from image upload operations.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The payload is not a decodable image data URL.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// CDN returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// A decoded image ready for upload.
struct DecodedImage {
    bytes: Vec<u8>,
    content_type: String,
}

/// Split a `data:image/...;base64,...` URL into its content type and
/// raw bytes.
fn decode_data_url(data_url: &str) -> Result<DecodedImage, MediaError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidImage("missing data: prefix".to_owned()))?;
    let (content_type, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| MediaError::InvalidImage("not base64-encoded".to_owned()))?;

    if !content_type.starts_with("image/") {
        return Err(MediaError::InvalidImage(format!(
            "unsupported content type {content_type}"
        )));
    }

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| MediaError::InvalidImage(format!("base64 decode failed: {e}")))?;
    if bytes.is_empty() {
        return Err(MediaError::InvalidImage("empty image".to_owned()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::InvalidImage(format!(
            "image exceeds {MAX_IMAGE_BYTES} bytes"
        )));
    }

    Ok(DecodedImage {
        bytes,
        content_type: content_type.to_owned(),
    })
}

/// File extension for a known image content type.
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

/// Client for the image CDN upload API.
#[derive(Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl MediaClient {
    /// Create a media client.
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Upload a base64 data URL and return the hosted image URL.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::InvalidImage` for undecodable payloads,
    /// other variants for transport and CDN failures.
    pub async fn upload(&self, data_url: &str) -> Result<String, MediaError> {
        let image = decode_data_url(data_url)?;
        let public_id = Uuid::new_v4().to_string();
        let file_name = format!("{public_id}.{}", extension_for(&image.content_type));

        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(file_name)
            .mime_str(&image.content_type)
            .map_err(|e| MediaError::InvalidImage(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("public_id", public_id)
            .part("file", part);

        let url = format!("{}/upload", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        Ok(upload.url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_data_url() {
        let image = decode_data_url(TINY_PNG).unwrap();
        assert_eq!(image.content_type, "image/png");
        assert!(!image.bytes.is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_prefix() {
        assert!(matches!(
            decode_data_url("iVBORw0KGgo="),
            Err(MediaError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_image() {
        let payload = format!("data:text/plain;base64,{}", BASE64.encode("hello"));
        assert!(matches!(
            decode_data_url(&payload),
            Err(MediaError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,not-base64!!!"),
            Err(MediaError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_extension_for_content_types() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/webp"), "webp");
    }
}
