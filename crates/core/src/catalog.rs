//! Product, variant and category models.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId, SalePrice};

/// A purchasable size option of a product.
///
/// Sizes are unique within a product; `available` never goes below zero
/// (both enforced by database constraints).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub size: String,
    pub available: i32,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Slugs of the categories this product is tagged with.
    pub categories: Vec<String>,
    pub description_short: String,
    pub description_long: String,
    pub featured_image: String,
    pub featured_image_hover: Option<String>,
    pub images: Vec<String>,
    pub price: Price,
    pub sale_price: SalePrice,
    /// Ordered list of size variants.
    pub variants: Vec<Variant>,
}

impl Product {
    /// The price a shopper currently pays: the sale price when one is
    /// active, else the base price.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.sale_price.get().unwrap_or(self.price)
    }

    /// Look up a size variant.
    #[must_use]
    pub fn variant(&self, size: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.size == size)
    }
}

/// A catalog category. The slug doubles as the identifier and is
/// immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Velvet Hoodie".to_owned(),
            slug: "velvet-hoodie".to_owned(),
            categories: vec!["winter".to_owned()],
            description_short: "Short".to_owned(),
            description_long: "Long".to_owned(),
            featured_image: "https://img.example/hoodie.jpg".to_owned(),
            featured_image_hover: None,
            images: vec![],
            price: Price::new(dec!(120)),
            sale_price: SalePrice::NONE,
            variants: vec![
                Variant {
                    size: "S".to_owned(),
                    available: 3,
                },
                Variant {
                    size: "M".to_owned(),
                    available: 0,
                },
            ],
        }
    }

    #[test]
    fn test_effective_price_without_sale() {
        assert_eq!(product().effective_price(), Price::new(dec!(120)));
    }

    #[test]
    fn test_effective_price_with_sale() {
        let mut p = product();
        p.sale_price = SalePrice::active(Price::new(dec!(90)));
        assert_eq!(p.effective_price(), Price::new(dec!(90)));
    }

    #[test]
    fn test_variant_lookup() {
        let p = product();
        assert_eq!(p.variant("S").unwrap().available, 3);
        assert!(p.variant("XL").is_none());
    }
}
