//! Checkout service: delivery form, fee rules, and order placement.
//!
//! The delivery form lives in the shopper's session and is saved one field
//! at a time as they type. Placing the order runs in a single database
//! transaction: stock decrements, the order insert, and the cart clear all
//! land together or not at all.

use rust_decimal::dec;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use nightbloom_core::{
    CartItem, DeliveryDetails, Email, OrderId, OrderItem, Price, Product, Uid,
};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::{ProductRepository, StockDecrement};
use crate::services::catalog::CatalogCache;
use crate::services::shipping::{DEFAULT_DELIVERY_FEE, ShippingClient, is_valid_postal_code};

/// Orders at or above this subtotal ship free.
pub const FREE_DELIVERY_THRESHOLD: Price = Price::new(dec!(399));

/// Marketing campaign: products whose name carries this marker ship free.
const PROMO_FREE_DELIVERY_MARKER: &str = "Interstellar";

/// Session key for the in-progress delivery form.
pub const CHECKOUT_FORM_SESSION_KEY: &str = "checkout_form";

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The delivery form is incomplete or invalid.
    #[error("invalid delivery form: {0}")]
    InvalidForm(String),

    /// There is nothing to buy.
    #[error("cart is empty")]
    EmptyCart,
}

/// The in-progress delivery form, persisted in the session per keystroke.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    /// Quoted fee for the entered postal code; threshold and promo rules
    /// may still zero it at order time.
    pub delivery_fee: Price,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            delivery_fee: DEFAULT_DELIVERY_FEE,
        }
    }
}

/// One editable field of the delivery form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Email,
    Phone,
    Address,
    City,
    State,
    PostalCode,
}

/// Whether any line qualifies the whole order for promo free delivery.
#[must_use]
pub fn promo_applies(item_names: &[&str]) -> bool {
    item_names
        .iter()
        .any(|name| name.contains(PROMO_FREE_DELIVERY_MARKER))
}

/// The fee actually charged: promo and threshold beat the quoted fee.
#[must_use]
pub fn delivery_fee(item_names: &[&str], subtotal: Price, quoted_fee: Price) -> Price {
    if promo_applies(item_names) || subtotal >= FREE_DELIVERY_THRESHOLD {
        Price::ZERO
    } else {
        quoted_fee
    }
}

/// Validate the completed form into delivery details.
///
/// # Errors
///
/// Returns a field-level message for the first problem found.
pub fn validate_form(form: &CheckoutForm) -> Result<DeliveryDetails, String> {
    let required = [
        (&form.name, "name"),
        (&form.phone, "phone"),
        (&form.address, "address"),
        (&form.city, "city"),
        (&form.state, "state"),
    ];
    for (value, field) in required {
        if value.trim().is_empty() {
            return Err(format!("{field} is required"));
        }
    }

    let email = Email::parse(&form.email).map_err(|e| format!("email: {e}"))?;

    if !is_valid_postal_code(&form.postal_code) {
        return Err("postal code must be 6 digits".to_owned());
    }

    Ok(DeliveryDetails {
        name: form.name.trim().to_owned(),
        email,
        phone: form.phone.trim().to_owned(),
        address: form.address.trim().to_owned(),
        city: form.city.trim().to_owned(),
        state: form.state.trim().to_owned(),
        postal_code: form.postal_code.clone(),
    })
}

/// Freeze one cart line into an order snapshot, preferring live catalog
/// data and falling back to the cart's cached copy when the product has
/// vanished since the cart page loaded.
#[must_use]
pub fn snapshot_item(item: &CartItem, products: &[Product]) -> OrderItem {
    let live = products.iter().find(|p| p.id == item.product_id);
    match live {
        Some(product) => OrderItem {
            product_id: item.product_id,
            item_name: product.name.clone(),
            item_price: product.effective_price(),
            quantity: item.quantity,
            size: item.size.clone(),
            image: product.featured_image.clone(),
            product_slug: product.slug.clone(),
            category_slug: product.categories.first().cloned().unwrap_or_default(),
        },
        None => OrderItem {
            product_id: item.product_id,
            item_name: item.item_name.clone(),
            item_price: item.item_price,
            quantity: item.quantity,
            size: item.size.clone(),
            image: item.image.clone(),
            product_slug: item.product_slug.clone(),
            category_slug: item.category_slug.clone(),
        },
    }
}

/// Checkout service bound to a pool, catalog cache and rate client.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    catalog: &'a CatalogCache,
    shipping: &'a ShippingClient,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        catalog: &'a CatalogCache,
        shipping: &'a ShippingClient,
    ) -> Self {
        Self {
            pool,
            catalog,
            shipping,
        }
    }

    /// Apply one field edit to the form. A complete postal code triggers
    /// a fee quote; anything else leaves the fee as it was.
    pub async fn apply_field(&self, form: &mut CheckoutForm, field: FormField, value: String) {
        match field {
            FormField::Name => form.name = value,
            FormField::Email => form.email = value,
            FormField::Phone => form.phone = value,
            FormField::Address => form.address = value,
            FormField::City => form.city = value,
            FormField::State => form.state = value,
            FormField::PostalCode => {
                form.postal_code = value;
                if is_valid_postal_code(&form.postal_code) {
                    form.delivery_fee = self.shipping.quote(&form.postal_code).await;
                }
            }
        }
    }

    /// Place the order.
    ///
    /// Stock decrement, order insert and cart clear run in one
    /// transaction. Payment has already happened by the time this is
    /// called, so stock is floored at zero rather than rejecting the sale.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to order,
    /// `CheckoutError::InvalidForm` for bad delivery details,
    /// `CheckoutError::Repository` on database failures.
    pub async fn create_order(
        &self,
        uid: &Uid,
        form: &CheckoutForm,
        payment_id: &str,
    ) -> Result<OrderId, CheckoutError> {
        let cart = CartRepository::new(self.pool)
            .get(uid)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;
        if cart.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let delivery = validate_form(form).map_err(CheckoutError::InvalidForm)?;

        let products = self.catalog.all().await?;
        let items: Vec<OrderItem> = cart
            .items
            .iter()
            .map(|item| snapshot_item(item, &products))
            .collect();

        let subtotal: Price = items.iter().map(OrderItem::line_total).sum();
        let names: Vec<&str> = items.iter().map(|i| i.item_name.as_str()).collect();
        let fee = delivery_fee(&names, subtotal, form.delivery_fee);

        let decrements: Vec<StockDecrement> = items
            .iter()
            .map(|item| StockDecrement {
                product_id: item.product_id,
                size: item.size.clone(),
                quantity: item.quantity,
            })
            .collect();

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ProductRepository::bulk_decrement_stock_tx(&mut tx, &decrements).await?;
        let order_id =
            OrderRepository::create_tx(&mut tx, uid, &items, payment_id, &delivery, fee).await?;
        CartRepository::clear_tx(&mut tx, cart.id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        // Stock changed; drop the cached listing.
        self.catalog.invalidate().await;

        tracing::info!(order_id = %order_id, %uid, "Order placed");
        Ok(order_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nightbloom_core::{ProductId, SalePrice, Variant};

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "5551234".to_owned(),
            address: "1 Loop Lane".to_owned(),
            city: "Berlin".to_owned(),
            state: "BE".to_owned(),
            postal_code: "100001".to_owned(),
            delivery_fee: DEFAULT_DELIVERY_FEE,
        }
    }

    #[test]
    fn test_delivery_fee_rules() {
        let quoted = Price::from(42);

        // Below threshold, no promo: quoted fee applies.
        assert_eq!(
            delivery_fee(&["Velvet Hoodie"], Price::from(100), quoted),
            quoted
        );

        // At or above threshold ships free.
        assert_eq!(
            delivery_fee(&["Velvet Hoodie"], Price::from(399), quoted),
            Price::ZERO
        );

        // Promo item ships free regardless of subtotal.
        assert_eq!(
            delivery_fee(&["Interstellar Bomber"], Price::from(10), quoted),
            Price::ZERO
        );
    }

    #[test]
    fn test_validate_form_happy_path() {
        let details = validate_form(&form()).unwrap();
        assert_eq!(details.name, "Ada");
        assert_eq!(details.postal_code, "100001");
    }

    #[test]
    fn test_validate_form_rejects_missing_and_invalid_fields() {
        let mut f = form();
        f.name = "  ".to_owned();
        assert!(validate_form(&f).unwrap_err().contains("name"));

        let mut f = form();
        f.email = "not-an-email".to_owned();
        assert!(validate_form(&f).unwrap_err().contains("email"));

        let mut f = form();
        f.postal_code = "12345".to_owned();
        assert!(validate_form(&f).unwrap_err().contains("postal code"));
    }

    #[test]
    fn test_form_default_fee_and_wire_names() {
        let f = CheckoutForm::default();
        assert_eq!(f.delivery_fee, DEFAULT_DELIVERY_FEE);

        let json = serde_json::to_value(&f).unwrap();
        assert!(json.get("postalCode").is_some());
        assert!(json.get("deliveryFee").is_some());
    }

    #[test]
    fn test_snapshot_item_prefers_live_catalog() {
        let product = Product {
            id: ProductId::new(1),
            name: "Renamed".to_owned(),
            slug: "renamed".to_owned(),
            categories: vec!["winter".to_owned()],
            description_short: String::new(),
            description_long: String::new(),
            featured_image: "new.jpg".to_owned(),
            featured_image_hover: None,
            images: vec![],
            price: Price::from(100),
            sale_price: SalePrice::active(Price::from(80)),
            variants: vec![Variant {
                size: "S".to_owned(),
                available: 5,
            }],
        };
        let item = CartItem {
            product_id: ProductId::new(1),
            size: "S".to_owned(),
            quantity: 2,
            item_price: Price::from(100),
            item_name: "Old Name".to_owned(),
            image: "old.jpg".to_owned(),
            category_slug: "all".to_owned(),
            product_slug: "old-name".to_owned(),
        };

        let snapped = snapshot_item(&item, std::slice::from_ref(&product));
        assert_eq!(snapped.item_name, "Renamed");
        assert_eq!(snapped.item_price, Price::from(80));

        // Vanished product: the cached line carries the snapshot.
        let stale = snapshot_item(&item, &[]);
        assert_eq!(stale.item_name, "Old Name");
        assert_eq!(stale.item_price, Price::from(100));
    }
}
