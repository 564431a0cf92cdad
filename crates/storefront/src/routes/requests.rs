//! Product request handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::requests::ProductRequestRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::OptionalUser;
use crate::state::AppState;

/// Requests longer than this are rejected rather than truncated.
const MAX_FIELD_LENGTH: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub product_name: String,
    pub size: String,
}

/// `POST /api/request-product` - record a restock request.
///
/// Open to anonymous shoppers; a signed-in uid and email are attached
/// when present.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Value>> {
    let product_name = req.product_name.trim();
    let size = req.size.trim();
    if product_name.is_empty() || size.is_empty() {
        return Err(AppError::BadRequest(
            "productName and size are required".to_owned(),
        ));
    }
    if product_name.len() > MAX_FIELD_LENGTH || size.len() > MAX_FIELD_LENGTH {
        return Err(AppError::BadRequest("field is too long".to_owned()));
    }

    let (uid, email) = match user {
        Some(u) => (Some(u.uid), u.email),
        None => (None, None),
    };
    let id = ProductRequestRepository::new(state.pool())
        .create(uid.as_ref(), email.as_deref(), product_name, size)
        .await?;

    Ok(Json(json!({ "id": id })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_wire_names() {
        let req: CreateRequest = serde_json::from_value(json!({
            "productName": "Velvet Hoodie",
            "size": "XXL",
        }))
        .unwrap();
        assert_eq!(req.product_name, "Velvet Hoodie");
        assert_eq!(req.size, "XXL");
    }
}
