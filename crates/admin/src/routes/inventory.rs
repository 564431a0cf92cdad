//! Inventory handlers.
//!
//! Both endpoints keep the wire shapes the back office UI already
//! speaks: single updates are absolute sets, bulk updates are
//! decrements applied after offline fulfilment corrections.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use nightbloom_core::{Product, ProductId};

use crate::db::RepositoryError;
use crate::db::products::{ProductRepository, StockDecrement};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

/// Fields are optional so missing ones produce a 400 with a message
/// instead of a bare deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockRequest {
    pub product_id: Option<i32>,
    pub size: Option<String>,
    pub new_quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStockUpdate {
    pub product_id: i32,
    pub size: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct BulkStockRequest {
    pub updates: Vec<BulkStockUpdate>,
}

/// `POST /api/updateProductStock` - set one variant's availability.
///
/// Responds with the updated product. Missing fields or a negative
/// quantity are a 400; an unknown product or size is a 404.
pub async fn update_stock(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<Value>> {
    let (Some(product_id), Some(size), Some(new_quantity)) =
        (req.product_id, req.size, req.new_quantity)
    else {
        return Err(AppError::BadRequest(
            "productId, size and newQuantity are required".to_owned(),
        ));
    };
    if new_quantity < 0 {
        return Err(AppError::BadRequest(
            "newQuantity must not be negative".to_owned(),
        ));
    }

    let repo = ProductRepository::new(state.pool());
    let id = ProductId::new(product_id);
    repo.set_stock(id, &size, new_quantity).await?;

    let product: Product = repo
        .get(id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;

    tracing::info!(product_id = %id, size = %size, new_quantity, "Stock updated");
    Ok(Json(json!({
        "message": "Stock updated successfully",
        "product": product,
    })))
}

/// `POST /api/updateBulkProductStock` - apply a batch of decrements.
///
/// Unknown products or sizes are skipped, not errors; the batch always
/// applies as far as it can.
pub async fn bulk_update(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Json(req): Json<BulkStockRequest>,
) -> Result<Json<Value>> {
    if req.updates.is_empty() {
        return Err(AppError::BadRequest("updates must not be empty".to_owned()));
    }

    let decrements: Vec<StockDecrement> = req
        .updates
        .into_iter()
        .map(|u| StockDecrement {
            product_id: ProductId::new(u.product_id),
            size: u.size,
            quantity: u.quantity,
        })
        .collect();

    let count = decrements.len();
    ProductRepository::new(state.pool())
        .bulk_decrement(&decrements)
        .await?;

    tracing::info!(count, "Bulk stock update applied");
    Ok(Json(json!({ "message": "Stock updated successfully" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_stock_wire_names() {
        let req: UpdateStockRequest = serde_json::from_value(json!({
            "productId": 7,
            "size": "M",
            "newQuantity": 12,
        }))
        .unwrap();
        assert_eq!(req.product_id, Some(7));
        assert_eq!(req.new_quantity, Some(12));
    }

    #[test]
    fn test_update_stock_tolerates_missing_fields() {
        let req: UpdateStockRequest = serde_json::from_value(json!({ "size": "M" })).unwrap();
        assert!(req.product_id.is_none());
        assert!(req.new_quantity.is_none());
    }

    #[test]
    fn test_bulk_request_wire_names() {
        let req: BulkStockRequest = serde_json::from_value(json!({
            "updates": [{"productId": 1, "size": "S", "quantity": 2}],
        }))
        .unwrap();
        assert_eq!(req.updates.first().unwrap().quantity, 2);
    }
}
