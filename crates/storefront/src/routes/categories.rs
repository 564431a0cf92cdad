//! Category handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use nightbloom_core::{Category, Product};

use crate::db::categories::CategoryRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET /api/categories` - all categories in curation order.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(Json(categories))
}

/// `GET /api/categories/{slug}` - one category.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .get(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;
    Ok(Json(category))
}

/// `GET /api/categories/{slug}/products` - products carrying this category.
pub async fn products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().all().await?;
    let filtered: Vec<Product> = products
        .iter()
        .filter(|p| p.categories.iter().any(|c| c == &slug))
        .cloned()
        .collect();
    Ok(Json(filtered))
}
