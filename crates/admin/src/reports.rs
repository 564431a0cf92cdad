//! Sales reporting aggregator.
//!
//! Everything here is pure computation over already-fetched orders, so
//! the whole module is testable without a database. The route layer
//! picks the time window, fetches the raw orders, and hands them over.
//!
//! Cancelled and refunded orders are excluded from the sales series and
//! performance tables; they show up only in the return statistics.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use nightbloom_core::{Order, OrderId, OrderStatus, Price, ProductId};

/// Whether an order counts toward sales figures.
const fn counts_toward_sales(status: OrderStatus) -> bool {
    !matches!(status, OrderStatus::Cancelled | OrderStatus::Refunded)
}

/// One day in the sales time series. Days without orders are present
/// with zeroes so charts never have holes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: u32,
    pub units: i64,
    pub revenue: Price,
}

/// Aggregated figures for one product across the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_id: ProductId,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Price,
    pub average_price: Decimal,
    pub distinct_orders: u32,
}

/// Aggregated figures for one size across the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePerformance {
    pub size: String,
    pub units_sold: i64,
    pub revenue: Price,
}

/// Aggregated figures for one category across the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub category_slug: String,
    pub units_sold: i64,
    pub revenue: Price,
}

/// Return and refund counts over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStats {
    pub returns: u32,
    pub refunds: u32,
}

/// The full report payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_orders: u32,
    pub total_revenue: Price,
    pub daily: Vec<DailySales>,
    pub products: Vec<ProductPerformance>,
    pub sizes: Vec<SizePerformance>,
    pub categories: Vec<CategoryPerformance>,
    pub returns: ReturnStats,
}

/// Build the full report for orders created in `[from, to)`.
///
/// The caller is expected to have already restricted `orders` to the
/// window; orders outside it are ignored rather than rejected.
#[must_use]
pub fn build_report(orders: &[Order], from: DateTime<Utc>, to: DateTime<Utc>) -> SalesReport {
    let in_window: Vec<&Order> = orders
        .iter()
        .filter(|o| o.created_at >= from && o.created_at < to)
        .collect();
    let sold: Vec<&Order> = in_window
        .iter()
        .copied()
        .filter(|o| counts_toward_sales(o.status))
        .collect();

    let total_revenue = sold.iter().map(|o| o.items_total()).sum();

    SalesReport {
        from: from.date_naive(),
        to: to.date_naive(),
        total_orders: u32::try_from(sold.len()).unwrap_or(u32::MAX),
        total_revenue,
        daily: daily_series(&sold, from.date_naive(), to.date_naive()),
        products: product_performance(&sold),
        sizes: size_performance(&sold),
        categories: category_performance(&sold),
        returns: return_stats(&in_window),
    }
}

/// Zero-filled per-day sales series over `[from, to)`.
fn daily_series(sold: &[&Order], from: NaiveDate, to: NaiveDate) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, (u32, i64, Price)> = BTreeMap::new();

    let mut day = from;
    while day < to {
        by_day.insert(day, (0, 0, Price::ZERO));
        let Some(next) = day.checked_add_days(Days::new(1)) else {
            break;
        };
        day = next;
    }

    for order in sold {
        let date = order.created_at.date_naive();
        if let Some((orders, units, revenue)) = by_day.get_mut(&date) {
            *orders += 1;
            *units += order.items.iter().map(|i| i64::from(i.quantity)).sum::<i64>();
            *revenue += order.items_total();
        }
    }

    by_day
        .into_iter()
        .map(|(date, (orders, units, revenue))| DailySales {
            date,
            orders,
            units,
            revenue,
        })
        .collect()
}

/// Per-product comparison, highest revenue first.
fn product_performance(sold: &[&Order]) -> Vec<ProductPerformance> {
    struct Acc {
        name: String,
        units: i64,
        revenue: Price,
        orders: HashSet<OrderId>,
    }

    let mut by_product: HashMap<ProductId, Acc> = HashMap::new();
    for order in sold {
        for item in &order.items {
            let acc = by_product.entry(item.product_id).or_insert_with(|| Acc {
                name: item.item_name.clone(),
                units: 0,
                revenue: Price::ZERO,
                orders: HashSet::new(),
            });
            acc.units += i64::from(item.quantity);
            acc.revenue += item.line_total();
            acc.orders.insert(order.id);
        }
    }

    let mut rows: Vec<ProductPerformance> = by_product
        .into_iter()
        .map(|(product_id, acc)| {
            let average_price = if acc.units == 0 {
                Decimal::ZERO
            } else {
                acc.revenue.as_decimal() / Decimal::from(acc.units)
            };
            ProductPerformance {
                product_id,
                name: acc.name,
                units_sold: acc.units,
                revenue: acc.revenue,
                average_price,
                distinct_orders: u32::try_from(acc.orders.len()).unwrap_or(u32::MAX),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.as_decimal().cmp(&a.revenue.as_decimal()));
    rows
}

/// Per-size comparison, highest units first.
fn size_performance(sold: &[&Order]) -> Vec<SizePerformance> {
    let mut by_size: HashMap<String, (i64, Price)> = HashMap::new();
    for order in sold {
        for item in &order.items {
            let (units, revenue) = by_size.entry(item.size.clone()).or_default();
            *units += i64::from(item.quantity);
            *revenue += item.line_total();
        }
    }

    let mut rows: Vec<SizePerformance> = by_size
        .into_iter()
        .map(|(size, (units_sold, revenue))| SizePerformance {
            size,
            units_sold,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.units_sold.cmp(&a.units_sold).then(a.size.cmp(&b.size)));
    rows
}

/// Per-category comparison, highest revenue first.
fn category_performance(sold: &[&Order]) -> Vec<CategoryPerformance> {
    let mut by_category: HashMap<String, (i64, Price)> = HashMap::new();
    for order in sold {
        for item in &order.items {
            let (units, revenue) = by_category.entry(item.category_slug.clone()).or_default();
            *units += i64::from(item.quantity);
            *revenue += item.line_total();
        }
    }

    let mut rows: Vec<CategoryPerformance> = by_category
        .into_iter()
        .map(|(category_slug, (units_sold, revenue))| CategoryPerformance {
            category_slug,
            units_sold,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.revenue
            .as_decimal()
            .cmp(&a.revenue.as_decimal())
            .then(a.category_slug.cmp(&b.category_slug))
    });
    rows
}

/// Replaced orders count as returns, refunded orders as refunds.
fn return_stats(in_window: &[&Order]) -> ReturnStats {
    let mut stats = ReturnStats {
        returns: 0,
        refunds: 0,
    };
    for order in in_window {
        match order.status {
            OrderStatus::Replaced => stats.returns += 1,
            OrderStatus::Refunded => stats.refunds += 1,
            _ => {}
        }
    }
    stats
}

/// A reporting window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportWindow {
    Week,
    Month,
    Quarter,
}

impl ReportWindow {
    /// Window length in days.
    #[must_use]
    pub const fn days(self) -> u64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }
}

impl std::str::FromStr for ReportWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7" | "week" => Ok(Self::Week),
            "30" | "month" => Ok(Self::Month),
            "90" | "quarter" => Ok(Self::Quarter),
            _ => Err(format!("invalid report window: {s} (expected 7, 30 or 90)")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::dec;

    use nightbloom_core::{DeliveryDetails, Email, OrderItem, PaymentStatus, Uid};

    use super::*;

    fn item(product_id: i32, name: &str, price: Decimal, quantity: i32, size: &str) -> OrderItem {
        OrderItem {
            product_id: ProductId::new(product_id),
            item_name: name.to_owned(),
            item_price: Price::new(price),
            quantity,
            size: size.to_owned(),
            image: String::new(),
            product_slug: name.to_lowercase().replace(' ', "-"),
            category_slug: "tops".to_owned(),
        }
    }

    fn order(id: i32, status: OrderStatus, day: u32, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(id),
            uid: Uid::new("u1"),
            items,
            payment_id: format!("pay_{id}"),
            payment_status: PaymentStatus::Success,
            status,
            tracking_code: String::new(),
            delivery: DeliveryDetails {
                name: "A".to_owned(),
                email: Email::parse("a@example.com").unwrap(),
                phone: "1".to_owned(),
                address: "Street 1".to_owned(),
                city: "Pune".to_owned(),
                state: "MH".to_owned(),
                postal_code: "411001".to_owned(),
            },
            created_at: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
            delivery_fee: Price::new(dec!(69)),
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_daily_series_zero_fills_and_excludes_cancelled() {
        let orders = vec![
            order(1, OrderStatus::Active, 2, vec![item(1, "Hoodie", dec!(100), 2, "M")]),
            order(2, OrderStatus::Cancelled, 2, vec![item(1, "Hoodie", dec!(100), 5, "M")]),
            order(3, OrderStatus::Delivered, 4, vec![item(2, "Tee", dec!(40), 1, "S")]),
        ];
        let (from, to) = window();
        let report = build_report(&orders, from, to);

        assert_eq!(report.daily.len(), 7);
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.total_revenue, Price::new(dec!(240)));

        let day2 = report.daily.get(1).unwrap();
        assert_eq!(day2.orders, 1);
        assert_eq!(day2.units, 2);
        assert_eq!(day2.revenue, Price::new(dec!(200)));

        let day1 = report.daily.first().unwrap();
        assert_eq!(day1.orders, 0);
        assert_eq!(day1.revenue, Price::ZERO);
    }

    #[test]
    fn test_product_performance_sorted_by_revenue() {
        let orders = vec![
            order(1, OrderStatus::Active, 2, vec![item(1, "Hoodie", dec!(100), 2, "M")]),
            order(2, OrderStatus::Active, 3, vec![
                item(1, "Hoodie", dec!(100), 1, "L"),
                item(2, "Tee", dec!(40), 1, "S"),
            ]),
        ];
        let (from, to) = window();
        let report = build_report(&orders, from, to);

        let top = report.products.first().unwrap();
        assert_eq!(top.product_id, ProductId::new(1));
        assert_eq!(top.units_sold, 3);
        assert_eq!(top.revenue, Price::new(dec!(300)));
        assert_eq!(top.average_price, dec!(100));
        assert_eq!(top.distinct_orders, 2);
    }

    #[test]
    fn test_size_and_category_performance() {
        let orders = vec![order(1, OrderStatus::Active, 2, vec![
            item(1, "Hoodie", dec!(100), 2, "M"),
            item(2, "Tee", dec!(40), 3, "S"),
        ])];
        let (from, to) = window();
        let report = build_report(&orders, from, to);

        let top_size = report.sizes.first().unwrap();
        assert_eq!(top_size.size, "S");
        assert_eq!(top_size.units_sold, 3);

        assert_eq!(report.categories.len(), 1);
        let category = report.categories.first().unwrap();
        assert_eq!(category.category_slug, "tops");
        assert_eq!(category.revenue, Price::new(dec!(320)));
    }

    #[test]
    fn test_return_stats_count_replaced_and_refunded() {
        let orders = vec![
            order(1, OrderStatus::Replaced, 2, vec![item(1, "Hoodie", dec!(100), 1, "M")]),
            order(2, OrderStatus::Refunded, 3, vec![item(1, "Hoodie", dec!(100), 1, "M")]),
            order(3, OrderStatus::Active, 4, vec![item(1, "Hoodie", dec!(100), 1, "M")]),
        ];
        let (from, to) = window();
        let report = build_report(&orders, from, to);

        assert_eq!(report.returns, ReturnStats { returns: 1, refunds: 1 });
        // Refunded revenue stays out of the sales totals.
        assert_eq!(report.total_revenue, Price::new(dec!(100)));
    }

    #[test]
    fn test_orders_outside_window_ignored() {
        let orders = vec![order(1, OrderStatus::Active, 20, vec![item(
            1,
            "Hoodie",
            dec!(100),
            1,
            "M",
        )])];
        let (from, to) = window();
        let report = build_report(&orders, from, to);
        assert_eq!(report.total_orders, 0);
    }

    #[test]
    fn test_report_window_parse() {
        assert_eq!("7".parse::<ReportWindow>().unwrap(), ReportWindow::Week);
        assert_eq!("month".parse::<ReportWindow>().unwrap(), ReportWindow::Month);
        assert_eq!(ReportWindow::Quarter.days(), 90);
        assert!("14".parse::<ReportWindow>().is_err());
    }
}
