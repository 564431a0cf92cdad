//! Product repository for catalog reads and stock mutations.
//!
//! Queries use the runtime sqlx API with `FromRow` structs so the workspace
//! builds without a live database. Products and their per-size variants live
//! in two tables and are stitched together in memory.

use sqlx::{PgConnection, PgPool};

use nightbloom_core::{Price, Product, ProductId, SalePrice, Variant};

use super::RepositoryError;

/// One stock decrement in a bulk update: (product, size, units sold).
#[derive(Debug, Clone)]
pub struct StockDecrement {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    categories: Vec<String>,
    description_short: String,
    description_long: String,
    featured_image: String,
    featured_image_hover: Option<String>,
    images: Vec<String>,
    price: rust_decimal::Decimal,
    sale_price: rust_decimal::Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    product_id: i32,
    size: String,
    available: i32,
}

impl ProductRow {
    fn into_product(self, variants: Vec<Variant>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            slug: self.slug,
            categories: self.categories,
            description_short: self.description_short,
            description_long: self.description_long,
            featured_image: self.featured_image,
            featured_image_hover: self.featured_image_hover,
            images: self.images,
            price: Price::new(self.price),
            sale_price: SalePrice::from(self.sale_price),
            variants,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product with its variants, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, categories, description_short, description_long,
                   featured_image, featured_image_hover, images, price, sale_price
            FROM store.products
            ORDER BY id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let variant_rows = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT product_id, size, available
            FROM store.product_variants
            ORDER BY product_id, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(group_products(rows, variant_rows))
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, categories, description_short, description_long,
                   featured_image, featured_image_hover, images, price, sale_price
            FROM store.products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let variants = self.variants_for(id).await?;
        Ok(Some(row.into_product(variants)))
    }

    /// Get a single product by URL slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, categories, description_short, description_long,
                   featured_image, featured_image_hover, images, price, sale_price
            FROM store.products
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let variants = self.variants_for(ProductId::new(row.id)).await?;
        Ok(Some(row.into_product(variants)))
    }

    /// List products carrying the given category slug, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_category(
        &self,
        category_slug: &str,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, slug, categories, description_short, description_long,
                   featured_image, featured_image_hover, images, price, sale_price
            FROM store.products
            WHERE $1 = ANY(categories)
            ORDER BY id DESC
            ",
        )
        .bind(category_slug)
        .fetch_all(self.pool)
        .await?;

        let variant_rows = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT v.product_id, v.size, v.available
            FROM store.product_variants v
            JOIN store.products p ON p.id = v.product_id
            WHERE $1 = ANY(p.categories)
            ORDER BY v.product_id, v.id
            ",
        )
        .bind(category_slug)
        .fetch_all(self.pool)
        .await?;

        Ok(group_products(rows, variant_rows))
    }

    /// Decrement stock for several (product, size) pairs within a transaction.
    ///
    /// Availability is floored at zero rather than rejected: by the time an
    /// order is paid the units are gone regardless of what the counter says.
    /// Rows for deleted products are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an update fails.
    pub async fn bulk_decrement_stock_tx(
        conn: &mut PgConnection,
        decrements: &[StockDecrement],
    ) -> Result<(), RepositoryError> {
        for dec in decrements {
            sqlx::query(
                r"
                UPDATE store.product_variants
                SET available = GREATEST(available - $3, 0)
                WHERE product_id = $1 AND size = $2
                ",
            )
            .bind(dec.product_id.as_i32())
            .bind(&dec.size)
            .bind(dec.quantity)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    async fn variants_for(&self, id: ProductId) -> Result<Vec<Variant>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT product_id, size, available
            FROM store.product_variants
            WHERE product_id = $1
            ORDER BY id
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|v| Variant {
                size: v.size,
                available: v.available,
            })
            .collect())
    }
}

/// Stitch flat variant rows onto their products, preserving product order.
fn group_products(rows: Vec<ProductRow>, variant_rows: Vec<VariantRow>) -> Vec<Product> {
    let mut variants_by_product: std::collections::HashMap<i32, Vec<Variant>> =
        std::collections::HashMap::new();
    for v in variant_rows {
        variants_by_product
            .entry(v.product_id)
            .or_default()
            .push(Variant {
                size: v.size,
                available: v.available,
            });
    }

    rows.into_iter()
        .map(|row| {
            let variants = variants_by_product.remove(&row.id).unwrap_or_default();
            row.into_product(variants)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn row(id: i32) -> ProductRow {
        ProductRow {
            id,
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            categories: vec!["all".to_owned()],
            description_short: String::new(),
            description_long: String::new(),
            featured_image: String::new(),
            featured_image_hover: None,
            images: vec![],
            price: dec!(100),
            sale_price: dec!(-1),
        }
    }

    #[test]
    fn test_group_products_preserves_order_and_attaches_variants() {
        let rows = vec![row(2), row(1)];
        let variant_rows = vec![
            VariantRow {
                product_id: 1,
                size: "S".to_owned(),
                available: 3,
            },
            VariantRow {
                product_id: 2,
                size: "M".to_owned(),
                available: 0,
            },
        ];

        let products = group_products(rows, variant_rows);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id.as_i32(), 2);
        assert_eq!(products[0].variants.len(), 1);
        assert_eq!(products[0].variants[0].size, "M");
        assert_eq!(products[1].variants[0].available, 3);
    }

    #[test]
    fn test_group_products_without_variants() {
        let products = group_products(vec![row(1)], vec![]);
        assert!(products[0].variants.is_empty());
    }
}
