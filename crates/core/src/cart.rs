//! Cart and line-item models.

use serde::{Deserialize, Serialize};

use crate::types::{CartId, Price, ProductId, Uid};

/// One (product, size, quantity) entry in a cart.
///
/// Besides the reference fields, a line item caches display data
/// (name, image, slugs) and the unit price seen when the item was added;
/// reconciliation back-fills `item_price` from the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i32,
    pub item_price: Price,
    pub item_name: String,
    pub image: String,
    pub category_slug: String,
    pub product_slug: String,
}

impl CartItem {
    /// Line total at the cached unit price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item_price.times(self.quantity)
    }
}

/// A shopper's cart: one per uid, created lazily, emptied (not deleted)
/// when an order completes.
///
/// At most one line item exists per (product, size) pair; quantities are
/// at least 1. `version` increments on every mutation so callers can tell
/// a stale snapshot from the persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub uid: Uid,
    pub items: Vec<CartItem>,
    pub version: i64,
}

impl Cart {
    /// Total number of units across all line items (badge count).
    #[must_use]
    pub fn items_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Subtotal at the cached line prices. Reconciliation recomputes this
    /// against the live catalog; this is only the cart's own view.
    #[must_use]
    pub fn cached_subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Find a line item by (product, size).
    #[must_use]
    pub fn item(&self, product_id: ProductId, size: &str) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id && item.size == size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn item(product_id: i32, size: &str, quantity: i32, price: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(product_id),
            size: size.to_owned(),
            quantity,
            item_price: Price::from(price),
            item_name: format!("Product {product_id}"),
            image: String::new(),
            category_slug: "all".to_owned(),
            product_slug: format!("product-{product_id}"),
        }
    }

    #[test]
    fn test_counts_and_subtotal() {
        let cart = Cart {
            id: CartId::new(1),
            uid: Uid::new("u1"),
            items: vec![item(1, "S", 2, 100), item(2, "M", 1, 50)],
            version: 1,
        };
        assert_eq!(cart.items_count(), 3);
        assert_eq!(cart.cached_subtotal(), Price::new(dec!(250)));
    }

    #[test]
    fn test_item_lookup_is_per_size() {
        let cart = Cart {
            id: CartId::new(1),
            uid: Uid::new("u1"),
            items: vec![item(1, "S", 2, 100)],
            version: 1,
        };
        assert!(cart.item(ProductId::new(1), "S").is_some());
        assert!(cart.item(ProductId::new(1), "M").is_none());
    }
}
