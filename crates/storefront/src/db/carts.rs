//! Cart repository.
//!
//! One cart per shopper uid, one `cart_items` row per (product, size).
//! Every mutation is a single SQL statement that also bumps the cart's
//! `version` counter through a CTE, so concurrent tabs never lose updates
//! to read-modify-write races.

use sqlx::{PgConnection, PgPool};

use nightbloom_core::{Cart, CartId, CartItem, Price, ProductId, Uid};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    uid: String,
    version: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: i32,
    size: String,
    quantity: i32,
    item_price: rust_decimal::Decimal,
    item_name: String,
    image: String,
    category_slug: String,
    product_slug: String,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            size: row.size,
            quantity: row.quantity,
            item_price: Price::new(row.item_price),
            item_name: row.item_name,
            image: row.image,
            category_slug: row.category_slug,
            product_slug: row.product_slug,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a shopper's cart with its line items, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, uid: &Uid) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, uid, version
            FROM store.carts
            WHERE uid = $1
            ",
        )
        .bind(uid.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT product_id, size, quantity, item_price, item_name,
                   image, category_slug, product_slug
            FROM store.cart_items
            WHERE cart_id = $1
            ORDER BY id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Cart {
            id: CartId::new(row.id),
            uid: Uid::new(&row.uid),
            items: items.into_iter().map(CartItem::from).collect(),
            version: row.version,
        }))
    }

    /// Get a shopper's cart, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if the cart vanishes between
    /// the insert and the read back.
    pub async fn ensure(&self, uid: &Uid) -> Result<Cart, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO store.carts (uid)
            VALUES ($1)
            ON CONFLICT (uid) DO NOTHING
            ",
        )
        .bind(uid.as_str())
        .execute(self.pool)
        .await?;

        self.get(uid).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!("cart missing after ensure for uid {uid}"))
        })
    }

    /// Add units of a (product, size) to the cart.
    ///
    /// If the line already exists the quantity is added in SQL, so two
    /// concurrent adds both land.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shopper has no cart,
    /// `RepositoryError::Database` on other failures.
    pub async fn add_item(&self, uid: &Uid, item: &CartItem) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            WITH bumped AS (
                UPDATE store.carts SET version = version + 1
                WHERE uid = $1
                RETURNING id
            )
            INSERT INTO store.cart_items
                (cart_id, product_id, size, quantity, item_price,
                 item_name, image, category_slug, product_slug)
            SELECT id, $2, $3, $4, $5, $6, $7, $8, $9 FROM bumped
            ON CONFLICT (cart_id, product_id, size)
            DO UPDATE SET quantity = store.cart_items.quantity + EXCLUDED.quantity,
                          item_price = EXCLUDED.item_price
            ",
        )
        .bind(uid.as_str())
        .bind(item.product_id.as_i32())
        .bind(&item.size)
        .bind(item.quantity)
        .bind(item.item_price.as_decimal())
        .bind(&item.item_name)
        .bind(&item.image)
        .bind(&item.category_slug)
        .bind(&item.product_slug)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("cart for uid {uid}")));
        }
        Ok(())
    }

    /// Remove a (product, size) line from the cart.
    ///
    /// Removing a line that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn remove_item(
        &self,
        uid: &Uid,
        product_id: ProductId,
        size: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            WITH bumped AS (
                UPDATE store.carts SET version = version + 1
                WHERE uid = $1
                RETURNING id
            )
            DELETE FROM store.cart_items
            WHERE cart_id IN (SELECT id FROM bumped)
              AND product_id = $2 AND size = $3
            ",
        )
        .bind(uid.as_str())
        .bind(product_id.as_i32())
        .bind(size)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set the quantity of an existing line outright.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn set_quantity(
        &self,
        uid: &Uid,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            WITH bumped AS (
                UPDATE store.carts SET version = version + 1
                WHERE uid = $1
                RETURNING id
            )
            UPDATE store.cart_items
            SET quantity = $4
            WHERE cart_id IN (SELECT id FROM bumped)
              AND product_id = $2 AND size = $3
            ",
        )
        .bind(uid.as_str())
        .bind(product_id.as_i32())
        .bind(size)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Persist a reconciled line: clamped quantity plus the live unit price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn set_line(
        &self,
        uid: &Uid,
        product_id: ProductId,
        size: &str,
        quantity: i32,
        item_price: Price,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            WITH bumped AS (
                UPDATE store.carts SET version = version + 1
                WHERE uid = $1
                RETURNING id
            )
            UPDATE store.cart_items
            SET quantity = $4, item_price = $5
            WHERE cart_id IN (SELECT id FROM bumped)
              AND product_id = $2 AND size = $3
            ",
        )
        .bind(uid.as_str())
        .bind(product_id.as_i32())
        .bind(size)
        .bind(quantity)
        .bind(item_price.as_decimal())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Empty a cart without deleting it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear(&self, uid: &Uid) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            WITH bumped AS (
                UPDATE store.carts SET version = version + 1
                WHERE uid = $1
                RETURNING id
            )
            DELETE FROM store.cart_items
            WHERE cart_id IN (SELECT id FROM bumped)
            ",
        )
        .bind(uid.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Empty a cart inside an open transaction (checkout completion).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn clear_tx(conn: &mut PgConnection, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            WITH bumped AS (
                UPDATE store.carts SET version = version + 1
                WHERE id = $1
                RETURNING id
            )
            DELETE FROM store.cart_items
            WHERE cart_id IN (SELECT id FROM bumped)
            ",
        )
        .bind(cart_id.as_i32())
        .execute(conn)
        .await?;

        Ok(())
    }
}
