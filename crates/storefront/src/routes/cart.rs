//! Cart handlers.
//!
//! Every mutation answers with the freshly reconciled snapshot so the
//! client never has to guess what the server did to the cart.

use axum::{Json, extract::State};
use serde::Deserialize;

use nightbloom_core::ProductId;

use crate::error::Result;
use crate::middleware::auth::RequireUser;
use crate::services::cart::CartSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub size: String,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub product_id: ProductId,
    pub size: String,
    pub new_quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub product_id: ProductId,
    pub size: String,
}

/// `GET /api/cart` - the reconciled cart.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartSnapshot>> {
    let snapshot = state.cart_service().fetch(&user.uid).await?;
    Ok(Json(snapshot))
}

/// `POST /api/cart/items` - add units of a (product, size).
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let snapshot = state
        .cart_service()
        .add_item(&user.uid, req.product_id, &req.size, req.quantity)
        .await?;
    Ok(Json(snapshot))
}

/// `PUT /api/cart/items/quantity` - set a line's quantity (0 removes it).
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let snapshot = state
        .cart_service()
        .change_quantity(&user.uid, req.product_id, &req.size, req.new_quantity)
        .await?;
    Ok(Json(snapshot))
}

/// `DELETE /api/cart/items` - drop a line.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<RemoveItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let snapshot = state
        .cart_service()
        .remove_item(&user.uid, req.product_id, &req.size)
        .await?;
    Ok(Json(snapshot))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_defaults_quantity() {
        let req: AddItemRequest =
            serde_json::from_str(r#"{"productId": 3, "size": "M"}"#).unwrap();
        assert_eq!(req.quantity, 1);
        assert_eq!(req.product_id, ProductId::new(3));
    }

    #[test]
    fn test_update_request_wire_names() {
        let req: UpdateItemRequest =
            serde_json::from_str(r#"{"productId": 3, "size": "M", "newQuantity": 4}"#).unwrap();
        assert_eq!(req.new_quantity, 4);
    }
}
