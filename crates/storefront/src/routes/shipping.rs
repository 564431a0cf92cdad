//! Delivery fee quote handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::services::shipping::is_valid_postal_code;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    /// Destination postal code, six digits.
    pub d_pin: String,
}

/// `GET /api/shipping-cost?d_pin=XXXXXX` - fee quote for a destination.
pub async fn quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<Value>> {
    if !is_valid_postal_code(&params.d_pin) {
        return Err(AppError::BadRequest(
            "d_pin must be a 6-digit postal code".to_owned(),
        ));
    }

    let fee = state.shipping().quote(&params.d_pin).await;
    Ok(Json(json!({ "total": fee })))
}
