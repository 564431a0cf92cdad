//! Product request listing handler.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::db::requests::ProductRequestRepository;
use crate::error::Result;
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

/// `GET /api/product-requests` - shopper restock requests, newest first.
pub async fn index(_staff: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    let requests = ProductRequestRepository::new(state.pool()).list_all().await?;
    Ok(Json(json!({ "requests": requests })))
}
