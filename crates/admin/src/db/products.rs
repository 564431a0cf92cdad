//! Product repository: the write side of the catalog.
//!
//! Creates, edits and deletions happen here and nowhere else; the
//! storefront binary only ever reads. Variant lists are replaced
//! wholesale on edit, the way the back office UI submits them.

use sqlx::PgPool;

use nightbloom_core::{Price, Product, ProductId, SalePrice, Variant};

use super::RepositoryError;

/// Fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub categories: Vec<String>,
    pub description_short: String,
    pub description_long: String,
    pub featured_image: String,
    pub featured_image_hover: Option<String>,
    pub images: Vec<String>,
    pub price: Price,
    pub sale_price: SalePrice,
    pub variants: Vec<Variant>,
}

/// One stock decrement in a bulk update: (product, size, units).
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

/// Repository for catalog write operations.
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

        Ok(rows
            .into_iter()
            .map(|row| {
                let variants = variants_by_product.remove(&row.id).unwrap_or_default();
                row.into_product(variants)
            })
            .collect())
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

        let variant_rows = sqlx::query_as::<_, VariantRow>(
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

        let variants = variant_rows
            .into_iter()
            .map(|v| Variant {
                size: v.size,
                available: v.available,
            })
            .collect();

        Ok(Some(row.into_product(variants)))
    }

    /// Create a product with its variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken,
    /// `RepositoryError::Database` on other failures.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: (i32,) = sqlx::query_as(
            r"
            INSERT INTO store.products
                (name, slug, categories, description_short, description_long,
                 featured_image, featured_image_hover, images, price, sale_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.categories)
        .bind(&input.description_short)
        .bind(&input.description_long)
        .bind(&input.featured_image)
        .bind(input.featured_image_hover.as_deref())
        .bind(&input.images)
        .bind(input.price.as_decimal())
        .bind(input.sale_price.as_decimal())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("slug {} already exists", input.slug));
            }
            RepositoryError::Database(e)
        })?;

        let id = ProductId::new(row.0);
        insert_variants(&mut tx, id, &input.variants).await?;
        tx.commit().await?;

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("product {id} missing after insert"))
        })
    }

    /// Replace a product's fields and variants.
    ///
    /// Variant rows are replaced wholesale; submitted availability wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// `RepositoryError::Conflict` on slug collisions.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE store.products
            SET name = $2, slug = $3, categories = $4, description_short = $5,
                description_long = $6, featured_image = $7, featured_image_hover = $8,
                images = $9, price = $10, sale_price = $11, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.categories)
        .bind(&input.description_short)
        .bind(&input.description_long)
        .bind(&input.featured_image)
        .bind(input.featured_image_hover.as_deref())
        .bind(&input.images)
        .bind(input.price.as_decimal())
        .bind(input.sale_price.as_decimal())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("slug {} already exists", input.slug));
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }

        sqlx::query("DELETE FROM store.product_variants WHERE product_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;
        insert_variants(&mut tx, id, &input.variants).await?;
        tx.commit().await?;

        self.get(id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("product {id} missing after update"))
        })
    }

    /// Delete a product and its variants.
    ///
    /// Order snapshots keep their copy; carts referencing the product are
    /// repaired by the storefront's reconciliation on next fetch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    /// Set one variant's availability to an absolute count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such (product, size) row
    /// exists.
    pub async fn set_stock(
        &self,
        id: ProductId,
        size: &str,
        available: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.product_variants
            SET available = $3
            WHERE product_id = $1 AND size = $2
            ",
        )
        .bind(id.as_i32())
        .bind(size)
        .bind(available)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "variant {size} of product {id}"
            )));
        }
        Ok(())
    }

    /// Apply a batch of stock decrements in one transaction.
    ///
    /// Availability floors at zero; rows for unknown products or sizes are
    /// skipped with a warning, matching how fulfilment corrections arrive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn bulk_decrement(&self, decrements: &[StockDecrement]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for dec in decrements {
            let result = sqlx::query(
                r"
                UPDATE store.product_variants
                SET available = GREATEST(available - $3, 0)
                WHERE product_id = $1 AND size = $2
                ",
            )
            .bind(dec.product_id.as_i32())
            .bind(&dec.size)
            .bind(dec.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tracing::warn!(
                    product_id = %dec.product_id,
                    size = %dec.size,
                    "Stock decrement skipped, no matching variant"
                );
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn insert_variants(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: ProductId,
    variants: &[Variant],
) -> Result<(), RepositoryError> {
    for variant in variants {
        sqlx::query(
            r"
            INSERT INTO store.product_variants (product_id, size, available)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(id.as_i32())
        .bind(&variant.size)
        .bind(variant.available.max(0))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
