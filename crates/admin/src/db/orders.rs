//! Order repository: fulfilment management.
//!
//! Orders arrive through the storefront's checkout transaction; the back
//! office only ever reads them and mutates status and tracking. There is
//! no delete.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nightbloom_core::{
    DeliveryDetails, Email, Order, OrderId, OrderItem, OrderStatus, PaymentStatus, Price,
    ProductId, Uid,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    uid: String,
    payment_id: String,
    payment_status: String,
    status: String,
    tracking_code: String,
    delivery_name: String,
    delivery_email: String,
    delivery_phone: String,
    delivery_address: String,
    delivery_city: String,
    delivery_state: String,
    delivery_postal_code: String,
    created_at: DateTime<Utc>,
    delivery_fee: rust_decimal::Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: i32,
    item_name: String,
    item_price: rust_decimal::Decimal,
    quantity: i32,
    size: String,
    image: String,
    product_slug: String,
    category_slug: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            item_name: row.item_name,
            item_price: Price::new(row.item_price),
            quantity: row.quantity,
            size: row.size,
            image: row.image,
            product_slug: row.product_slug,
            category_slug: row.category_slug,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let payment_status = self.payment_status.parse::<PaymentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;
        let email = Email::parse(&self.delivery_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            uid: Uid::new(self.uid),
            items,
            payment_id: self.payment_id,
            payment_status,
            status,
            tracking_code: self.tracking_code,
            delivery: DeliveryDetails {
                name: self.delivery_name,
                email,
                phone: self.delivery_phone,
                address: self.delivery_address,
                city: self.delivery_city,
                state: self.delivery_state,
                postal_code: self.delivery_postal_code,
            },
            created_at: self.created_at,
            delivery_fee: Price::new(self.delivery_fee),
        })
    }
}

/// Repository for back office order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every order, most recent first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, OrderRow>(
                    r"
                    SELECT id, uid, payment_id, payment_status, status, tracking_code,
                           delivery_name, delivery_email, delivery_phone, delivery_address,
                           delivery_city, delivery_state, delivery_postal_code,
                           created_at, delivery_fee
                    FROM store.orders
                    WHERE status = $1
                    ORDER BY created_at DESC
                    ",
                )
                .bind(status.to_string())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(
                    r"
                    SELECT id, uid, payment_id, payment_status, status, tracking_code,
                           delivery_name, delivery_email, delivery_phone, delivery_address,
                           delivery_city, delivery_state, delivery_postal_code,
                           created_at, delivery_fee
                    FROM store.orders
                    ORDER BY created_at DESC
                    ",
                )
                .fetch_all(self.pool)
                .await?
            }
        };

        self.attach_items(rows).await
    }

    /// List orders created in a half-open time range, oldest first.
    /// Feeds the reports aggregator.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, uid, payment_id, payment_status, status, tracking_code,
                   delivery_name, delivery_email, delivery_phone, delivery_address,
                   delivery_city, delivery_state, delivery_postal_code,
                   created_at, delivery_fee
            FROM store.orders
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY created_at
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Get a single order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, uid, payment_id, payment_status, status, tracking_code,
                   delivery_name, delivery_email, delivery_phone, delivery_address,
                   delivery_city, delivery_state, delivery_postal_code,
                   created_at, delivery_fee
            FROM store.orders
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, item_name, item_price, quantity,
                   size, image, product_slug, category_slug
            FROM store.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(row.into_order(
            item_rows.into_iter().map(OrderItem::from).collect(),
        )?))
    }

    /// Set an order's status. Any status may follow any other; staff
    /// corrections are part of the workflow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE store.orders SET status = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(status.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("order {id}")));
        }
        Ok(())
    }

    /// Set an order's courier tracking code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_tracking(
        &self,
        id: OrderId,
        tracking_code: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE store.orders SET tracking_code = $2 WHERE id = $1")
            .bind(id.as_i32())
            .bind(tracking_code)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("order {id}")));
        }
        Ok(())
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let order_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, item_name, item_price, quantity,
                   size, image, product_slug, category_slug
            FROM store.order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: std::collections::HashMap<i32, Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from(item));
        }

        rows.into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}
