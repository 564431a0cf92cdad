//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use nightbloom_core::Product;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /api/products` - every product, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().all().await?;
    Ok(Json(products.as_ref().clone()))
}

/// `GET /api/products/{slug}` - one product by slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let product = state
        .catalog()
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;
    Ok(Json(product))
}
