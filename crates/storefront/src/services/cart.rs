//! Cart service: mutations plus catalog reconciliation.
//!
//! A cart is stored as bare (product, size, quantity) lines with cached
//! display data. Every fetch reconciles those lines against the live
//! catalog: vanished products and sizes are dropped, over-stock quantities
//! are clamped and persisted, and prices are back-filled from the catalog.
//! A snapshot that needed repair is flagged `block_checkout`; the client
//! must re-fetch before checking out.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use nightbloom_core::{Cart, CartItem, Price, Product, ProductId, Uid};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::services::catalog::CatalogCache;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The requested (product, size) does not exist or has no stock.
    #[error("product {0} is not available in size {1}")]
    Unavailable(ProductId, String),

    /// Quantities are always at least 1; zero means remove.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// How one cart line fared against the live catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum LineResolution {
    /// Line stays, at the catalog's current unit price.
    Keep { unit_price: Price },
    /// Stock no longer covers the stored quantity; clamp to what is left.
    Clamp { to: i32, unit_price: Price },
    /// Line must be removed.
    Drop(DropReason),
}

/// Why a line was removed during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    ProductGone,
    SizeGone,
    OutOfStock,
}

/// A shopper-facing note about a repaired line.
#[derive(Debug, Clone, Serialize)]
pub struct StockWarning {
    pub product_id: ProductId,
    pub item_name: String,
    pub size: String,
    pub message: String,
}

/// Reconciled view of a cart, ready to serialize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub subtotal: Price,
    pub items_count: i32,
    pub warnings: Vec<StockWarning>,
    /// True when this fetch repaired the cart; the client must re-fetch
    /// before checkout so the shopper sees what they are paying for.
    pub block_checkout: bool,
}

impl CartSnapshot {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::ZERO,
            items_count: 0,
            warnings: Vec::new(),
            block_checkout: false,
        }
    }
}

/// Resolve one stored line against the live catalog.
#[must_use]
pub fn resolve_line(item: &CartItem, products: &[Product]) -> LineResolution {
    let Some(product) = products.iter().find(|p| p.id == item.product_id) else {
        return LineResolution::Drop(DropReason::ProductGone);
    };
    let Some(variant) = product.variant(&item.size) else {
        return LineResolution::Drop(DropReason::SizeGone);
    };
    if variant.available <= 0 {
        return LineResolution::Drop(DropReason::OutOfStock);
    }

    let unit_price = product.effective_price();
    if item.quantity > variant.available {
        LineResolution::Clamp {
            to: variant.available,
            unit_price,
        }
    } else {
        LineResolution::Keep { unit_price }
    }
}

/// Cart service bound to a pool and catalog cache.
pub struct CartService<'a> {
    pool: &'a PgPool,
    catalog: &'a CatalogCache,
}

impl<'a> CartService<'a> {
    /// Create a cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, catalog: &'a CatalogCache) -> Self {
        Self { pool, catalog }
    }

    /// Fetch and reconcile a shopper's cart.
    ///
    /// A cart that fails to load reads as empty rather than failing the
    /// page; the warning lands in the logs. Write failures during repair
    /// do propagate.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the catalog read or a repair
    /// write fails.
    pub async fn fetch(&self, uid: &Uid) -> Result<CartSnapshot, CartError> {
        let repo = CartRepository::new(self.pool);

        let cart = match repo.get(uid).await {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(error = %err, %uid, "Cart read failed, treating as empty");
                return Ok(CartSnapshot::empty());
            }
        };
        let Some(cart) = cart else {
            return Ok(CartSnapshot::empty());
        };

        let products = self.catalog.all().await?;
        self.reconcile(&repo, cart, &products).await
    }

    /// Add units of a (product, size) to the cart, creating the cart if
    /// needed. The quantity is capped at current availability.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for quantities below 1,
    /// `CartError::Unavailable` if the (product, size) cannot be bought,
    /// `CartError::Repository` on database failures.
    pub async fn add_item(
        &self,
        uid: &Uid,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<CartSnapshot, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .catalog
            .find(product_id)
            .await?
            .ok_or_else(|| CartError::Unavailable(product_id, size.to_owned()))?;
        let variant = product
            .variant(size)
            .ok_or_else(|| CartError::Unavailable(product_id, size.to_owned()))?;
        if variant.available <= 0 {
            return Err(CartError::Unavailable(product_id, size.to_owned()));
        }

        let repo = CartRepository::new(self.pool);
        let cart = repo.ensure(uid).await?;

        // The SQL upsert adds quantities, so cap the increment at what
        // stock still covers on top of the stored line.
        let already = cart.item(product_id, size).map_or(0, |i| i.quantity);
        let capped = quantity.min((variant.available - already).max(0));
        if capped > 0 {
            let item = CartItem {
                product_id,
                size: size.to_owned(),
                quantity: capped,
                item_price: product.effective_price(),
                item_name: product.name.clone(),
                image: product.featured_image.clone(),
                category_slug: product.categories.first().cloned().unwrap_or_default(),
                product_slug: product.slug.clone(),
            };
            repo.add_item(uid, &item).await?;
        }

        self.fetch(uid).await
    }

    /// Remove one (product, size) line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` on database failures.
    pub async fn remove_item(
        &self,
        uid: &Uid,
        product_id: ProductId,
        size: &str,
    ) -> Result<CartSnapshot, CartError> {
        CartRepository::new(self.pool)
            .remove_item(uid, product_id, size)
            .await?;
        self.fetch(uid).await
    }

    /// Set a line's quantity outright, capped at current availability.
    /// Quantity 0 removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for negative quantities,
    /// `CartError::Repository` on database failures.
    pub async fn change_quantity(
        &self,
        uid: &Uid,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<CartSnapshot, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity == 0 {
            return self.remove_item(uid, product_id, size).await;
        }

        let available = self
            .catalog
            .find(product_id)
            .await?
            .and_then(|p| p.variant(size).map(|v| v.available))
            .unwrap_or(0);
        if available <= 0 {
            return self.remove_item(uid, product_id, size).await;
        }

        CartRepository::new(self.pool)
            .set_quantity(uid, product_id, size, quantity.min(available))
            .await?;
        self.fetch(uid).await
    }

    /// Repair a stored cart against the live catalog and build the snapshot.
    async fn reconcile(
        &self,
        repo: &CartRepository<'_>,
        cart: Cart,
        products: &[Product],
    ) -> Result<CartSnapshot, CartError> {
        let mut snapshot = CartSnapshot::empty();

        for item in cart.items {
            match resolve_line(&item, products) {
                LineResolution::Keep { unit_price } => {
                    let mut kept = item;
                    kept.item_price = unit_price;
                    snapshot.subtotal += kept.line_total();
                    snapshot.items.push(kept);
                }
                LineResolution::Clamp { to, unit_price } => {
                    repo.set_line(&cart.uid, item.product_id, &item.size, to, unit_price)
                        .await?;
                    snapshot.warnings.push(StockWarning {
                        product_id: item.product_id,
                        item_name: item.item_name.clone(),
                        size: item.size.clone(),
                        message: format!("Only {to} left in stock; quantity was reduced"),
                    });
                    snapshot.block_checkout = true;

                    // Shown at the clamped quantity, but left out of the
                    // subtotal until the shopper sees the repaired cart.
                    let mut clamped = item;
                    clamped.quantity = to;
                    clamped.item_price = unit_price;
                    snapshot.items.push(clamped);
                }
                LineResolution::Drop(reason) => {
                    repo.remove_item(&cart.uid, item.product_id, &item.size)
                        .await?;
                    snapshot.warnings.push(StockWarning {
                        product_id: item.product_id,
                        item_name: item.item_name.clone(),
                        size: item.size.clone(),
                        message: match reason {
                            DropReason::ProductGone => {
                                "This product is no longer available".to_owned()
                            }
                            DropReason::SizeGone => "This size is no longer offered".to_owned(),
                            DropReason::OutOfStock => "This item sold out".to_owned(),
                        },
                    });
                    snapshot.block_checkout = true;
                }
            }
        }

        snapshot.items_count = snapshot.items.iter().map(|i| i.quantity).sum();
        Ok(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use nightbloom_core::{SalePrice, Variant};

    use super::*;

    fn product(id: i32, size: &str, available: i32, price: i64, sale: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            categories: vec!["all".to_owned()],
            description_short: String::new(),
            description_long: String::new(),
            featured_image: String::new(),
            featured_image_hover: None,
            images: vec![],
            price: Price::from(price),
            sale_price: sale.map_or(SalePrice::NONE, |s| SalePrice::active(Price::from(s))),
            variants: vec![Variant {
                size: size.to_owned(),
                available,
            }],
        }
    }

    fn line(product_id: i32, size: &str, quantity: i32, price: i64) -> CartItem {
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
    fn test_resolve_keeps_in_stock_line_at_live_price() {
        let products = vec![product(1, "S", 10, 120, None)];
        let resolution = resolve_line(&line(1, "S", 2, 100), &products);
        assert_eq!(
            resolution,
            LineResolution::Keep {
                unit_price: Price::from(120)
            }
        );
    }

    #[test]
    fn test_resolve_uses_sale_price() {
        let products = vec![product(1, "S", 10, 120, Some(90))];
        let resolution = resolve_line(&line(1, "S", 1, 120), &products);
        assert_eq!(
            resolution,
            LineResolution::Keep {
                unit_price: Price::from(90)
            }
        );
    }

    #[test]
    fn test_resolve_clamps_over_stock() {
        let products = vec![product(1, "S", 3, 100, None)];
        let resolution = resolve_line(&line(1, "S", 5, 100), &products);
        assert_eq!(
            resolution,
            LineResolution::Clamp {
                to: 3,
                unit_price: Price::from(100)
            }
        );
    }

    #[test]
    fn test_resolve_drops_vanished_lines() {
        let products = vec![product(1, "S", 0, 100, None)];
        assert_eq!(
            resolve_line(&line(2, "S", 1, 100), &products),
            LineResolution::Drop(DropReason::ProductGone)
        );
        assert_eq!(
            resolve_line(&line(1, "M", 1, 100), &products),
            LineResolution::Drop(DropReason::SizeGone)
        );
        assert_eq!(
            resolve_line(&line(1, "S", 1, 100), &products),
            LineResolution::Drop(DropReason::OutOfStock)
        );
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = CartSnapshot {
            items: vec![],
            subtotal: Price::new(dec!(250)),
            items_count: 3,
            warnings: vec![],
            block_checkout: true,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["itemsCount"], 3);
        assert_eq!(json["blockCheckout"], true);
    }
}
