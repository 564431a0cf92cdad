//! Image upload proxy handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::Result;
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub image_base64: String,
}

/// `POST /api/uploadImage` - decode a base64 data URL and forward it to
/// the image CDN. Responds with the hosted URL.
pub async fn upload_image(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<Value>> {
    let url = state.media().upload(&req.image_base64).await?;

    tracing::info!(url = %url, "Image uploaded");
    Ok(Json(json!({ "url": url })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_wire_name() {
        let req: UploadRequest =
            serde_json::from_value(json!({ "imageBase64": "data:image/png;base64,AA==" })).unwrap();
        assert!(req.image_base64.starts_with("data:image/png"));
    }
}
