//! Order, snapshot-item and delivery-detail models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, OrderStatus, PaymentStatus, Price, ProductId, Uid};

/// An immutable snapshot of one cart line at order time.
///
/// Decoupled from the live catalog on purpose: later product edits or
/// deletions never change what an order says was bought and at what price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub item_name: String,
    pub item_price: Price,
    pub quantity: i32,
    pub size: String,
    pub image: String,
    pub product_slug: String,
    pub category_slug: String,
}

impl OrderItem {
    /// Line total at the snapshot price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item_price.times(self.quantity)
    }
}

/// Shipping address and contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// A placed order. Created once at checkout completion, never deleted,
/// only status-mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub uid: Uid,
    pub items: Vec<OrderItem>,
    pub payment_id: String,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub tracking_code: String,
    pub delivery: DeliveryDetails,
    pub created_at: DateTime<Utc>,
    pub delivery_fee: Price,
}

impl Order {
    /// Sum of all snapshot line totals, delivery fee excluded.
    #[must_use]
    pub fn items_total(&self) -> Price {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// What the shopper paid: items plus delivery fee.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.items_total() + self.delivery_fee
    }
}

/// Sort orders most recent first.
pub fn sort_by_recency(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Keep only orders with the given status.
#[must_use]
pub fn filter_by_status(orders: Vec<Order>, status: OrderStatus) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|order| order.status == status)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::dec;

    use super::*;

    fn order(id: i32, status: OrderStatus, ts: i64) -> Order {
        Order {
            id: OrderId::new(id),
            uid: Uid::new("u1"),
            items: vec![OrderItem {
                product_id: ProductId::new(1),
                item_name: "Velvet Hoodie".to_owned(),
                item_price: Price::new(dec!(100)),
                quantity: 2,
                size: "S".to_owned(),
                image: String::new(),
                product_slug: "velvet-hoodie".to_owned(),
                category_slug: "winter".to_owned(),
            }],
            payment_id: "pay_1".to_owned(),
            payment_status: PaymentStatus::Success,
            status,
            tracking_code: String::new(),
            delivery: DeliveryDetails {
                name: "A".to_owned(),
                email: Email::parse("a@example.com").unwrap(),
                phone: "1".to_owned(),
                address: "Street 1".to_owned(),
                city: "Berlin".to_owned(),
                state: "BE".to_owned(),
                postal_code: "101112".to_owned(),
            },
            created_at: Utc.timestamp_opt(ts, 0).unwrap(),
            delivery_fee: Price::new(dec!(69)),
        }
    }

    #[test]
    fn test_totals() {
        let o = order(1, OrderStatus::Active, 1_700_000_000);
        assert_eq!(o.items_total(), Price::new(dec!(200)));
        assert_eq!(o.grand_total(), Price::new(dec!(269)));
    }

    #[test]
    fn test_sort_by_recency() {
        let mut orders = vec![
            order(1, OrderStatus::Active, 100),
            order(2, OrderStatus::Active, 300),
            order(3, OrderStatus::Active, 200),
        ];
        sort_by_recency(&mut orders);
        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_filter_by_status() {
        let orders = vec![
            order(1, OrderStatus::Active, 100),
            order(2, OrderStatus::Cancelled, 200),
        ];
        let cancelled = filter_by_status(orders, OrderStatus::Cancelled);
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled.first().unwrap().id.as_i32(), 2);
    }
}
