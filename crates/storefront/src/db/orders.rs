//! Order repository.
//!
//! Orders are written exactly once, inside the checkout transaction, and
//! never deleted. Status and tracking updates happen through the back
//! office, not here.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

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

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order with its snapshot items inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn create_tx(
        conn: &mut PgConnection,
        uid: &Uid,
        items: &[OrderItem],
        payment_id: &str,
        delivery: &DeliveryDetails,
        delivery_fee: Price,
    ) -> Result<OrderId, RepositoryError> {
        let order_id: (i32,) = sqlx::query_as(
            r"
            INSERT INTO store.orders
                (uid, payment_id, payment_status, status, tracking_code,
                 delivery_name, delivery_email, delivery_phone, delivery_address,
                 delivery_city, delivery_state, delivery_postal_code, delivery_fee)
            VALUES ($1, $2, $3, $4, '', $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(uid.as_str())
        .bind(payment_id)
        .bind(PaymentStatus::Success.to_string())
        .bind(OrderStatus::Active.to_string())
        .bind(&delivery.name)
        .bind(delivery.email.as_str())
        .bind(&delivery.phone)
        .bind(&delivery.address)
        .bind(&delivery.city)
        .bind(&delivery.state)
        .bind(&delivery.postal_code)
        .bind(delivery_fee.as_decimal())
        .fetch_one(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO store.order_items
                    (order_id, product_id, item_name, item_price, quantity,
                     size, image, product_slug, category_slug)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(order_id.0)
            .bind(item.product_id.as_i32())
            .bind(&item.item_name)
            .bind(item.item_price.as_decimal())
            .bind(item.quantity)
            .bind(&item.size)
            .bind(&item.image)
            .bind(&item.product_slug)
            .bind(&item.category_slug)
            .execute(&mut *conn)
            .await?;
        }

        Ok(OrderId::new(order_id.0))
    }

    /// List a shopper's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_user(&self, uid: &Uid) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, uid, payment_id, payment_status, status, tracking_code,
                   delivery_name, delivery_email, delivery_phone, delivery_address,
                   delivery_city, delivery_state, delivery_postal_code,
                   created_at, delivery_fee
            FROM store.orders
            WHERE uid = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(uid.as_str())
        .fetch_all(self.pool)
        .await?;

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
}
