//! Product management handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use nightbloom_core::{Price, Product, ProductId, SalePrice, Variant};

use crate::db::products::{ProductInput, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
    pub size: String,
    pub available: i32,
}

/// Incoming product fields. Prices arrive as decimal strings; a missing
/// or negative `salePrice` means no sale.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description_short: String,
    #[serde(default)]
    pub description_long: String,
    pub featured_image: String,
    pub featured_image_hover: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub variants: Vec<VariantPayload>,
}

impl ProductPayload {
    fn into_input(self) -> std::result::Result<ProductInput, String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_owned());
        }
        if self.slug.trim().is_empty() {
            return Err("slug must not be empty".to_owned());
        }
        if self.price < Decimal::ZERO {
            return Err("price must not be negative".to_owned());
        }
        if self.variants.is_empty() {
            return Err("at least one variant is required".to_owned());
        }

        let sale_price = match self.sale_price {
            Some(d) if d >= Decimal::ZERO => SalePrice::active(Price::new(d)),
            _ => SalePrice::NONE,
        };

        Ok(ProductInput {
            name: self.name,
            slug: self.slug,
            categories: self.categories,
            description_short: self.description_short,
            description_long: self.description_long,
            featured_image: self.featured_image,
            featured_image_hover: self.featured_image_hover,
            images: self.images,
            price: Price::new(self.price),
            sale_price,
            variants: self
                .variants
                .into_iter()
                .map(|v| Variant {
                    size: v.size,
                    available: v.available.max(0),
                })
                .collect(),
        })
    }
}

/// `GET /api/products` - list every product.
pub async fn index(_staff: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(json!({ "products": products })))
}

/// `GET /api/products/{id}` - one product.
pub async fn show(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// `POST /api/products` - create a product.
pub async fn create(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let input = payload.into_input().map_err(AppError::BadRequest)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok(Json(product))
}

/// `PUT /api/products/{id}` - replace a product's fields and variants.
pub async fn update(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let input = payload.into_input().map_err(AppError::BadRequest)?;
    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await?;

    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /api/products/{id}` - delete a product.
pub async fn delete(
    _staff: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn payload() -> ProductPayload {
        serde_json::from_value(json!({
            "name": "Velvet Hoodie",
            "slug": "velvet-hoodie",
            "categories": ["winter"],
            "featuredImage": "https://img.example/hoodie.jpg",
            "price": "120",
            "variants": [{"size": "S", "available": 3}],
        }))
        .unwrap()
    }

    #[test]
    fn test_payload_wire_names() {
        let p = payload();
        assert_eq!(p.featured_image, "https://img.example/hoodie.jpg");
        assert_eq!(p.price, dec!(120));
        assert!(p.sale_price.is_none());
    }

    #[test]
    fn test_into_input_defaults_sale_price() {
        let input = payload().into_input().unwrap();
        assert_eq!(input.sale_price, SalePrice::NONE);
        assert_eq!(input.price, Price::new(dec!(120)));
    }

    #[test]
    fn test_into_input_rejects_empty_name() {
        let mut p = payload();
        p.name = "  ".to_owned();
        assert!(p.into_input().is_err());
    }

    #[test]
    fn test_into_input_rejects_negative_price() {
        let mut p = payload();
        p.price = dec!(-1);
        assert!(p.into_input().is_err());
    }

    #[test]
    fn test_into_input_floors_negative_availability() {
        let mut p = payload();
        p.variants = vec![VariantPayload {
            size: "M".to_owned(),
            available: -5,
        }];
        let input = p.into_input().unwrap();
        assert_eq!(input.variants.first().unwrap().available, 0);
    }

    #[test]
    fn test_negative_sale_price_means_no_sale() {
        let mut p = payload();
        p.sale_price = Some(dec!(-1));
        let input = p.into_input().unwrap();
        assert_eq!(input.sale_price, SalePrice::NONE);
    }
}
