//! Category management handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use nightbloom_core::Category;

use crate::db::categories::{CategoryInput, CategoryRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(default)]
    pub position: i32,
}

impl CategoryPayload {
    fn into_input(self) -> std::result::Result<CategoryInput, String> {
        if self.slug.trim().is_empty() {
            return Err("slug must not be empty".to_owned());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_owned());
        }
        Ok(CategoryInput {
            slug: self.slug,
            name: self.name,
            description: self.description,
            image: self.image,
            position: self.position,
        })
    }
}

/// `GET /api/categories` - list categories in curation order.
pub async fn index(_staff: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(Json(json!({ "categories": categories })))
}

/// `POST /api/categories` - create a category.
pub async fn create(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    let input = payload.into_input().map_err(AppError::BadRequest)?;
    let category = CategoryRepository::new(state.pool()).create(&input).await?;

    tracing::info!(slug = %category.slug, "Category created");
    Ok(Json(category))
}

/// `PUT /api/categories/{slug}` - edit a category. The slug in the path
/// wins; the payload slug is ignored since slugs are immutable.
pub async fn update(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    let input = payload.into_input().map_err(AppError::BadRequest)?;
    let category = CategoryRepository::new(state.pool())
        .update(&slug, &input)
        .await?;

    tracing::info!(slug = %category.slug, "Category updated");
    Ok(Json(category))
}

/// `DELETE /api/categories/{slug}` - delete a category.
pub async fn delete(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    CategoryRepository::new(state.pool()).delete(&slug).await?;

    tracing::info!(slug = %slug, "Category deleted");
    Ok(Json(json!({ "ok": true })))
}
