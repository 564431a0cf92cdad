//! Monetary amounts using decimal arithmetic.
//!
//! The store trades in a single currency (EUR), so prices are a plain
//! decimal amount. Sale prices carry the wire-level sentinel `-1` meaning
//! "no active discount; use the base price", preserved because catalog
//! documents and order snapshots are stored and exchanged in that form.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Line total for a quantity of this unit price.
    #[must_use]
    pub fn times(&self, quantity: i32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An optional sale price using the sentinel value `-1` for "no sale".
///
/// Catalog documents store the sentinel directly, so this type keeps the
/// raw value on the wire and in the database and exposes an `Option`-shaped
/// accessor for the business rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalePrice(Decimal);

impl SalePrice {
    /// No active discount.
    pub const NONE: Self = Self(Decimal::NEGATIVE_ONE);

    /// An active sale at the given price.
    #[must_use]
    pub const fn active(price: Price) -> Self {
        Self(price.as_decimal())
    }

    /// The raw stored value, sentinel included.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The sale price, or `None` when the sentinel is stored.
    #[must_use]
    pub fn get(&self) -> Option<Price> {
        if self.0 == Decimal::NEGATIVE_ONE {
            None
        } else {
            Some(Price::new(self.0))
        }
    }
}

impl Default for SalePrice {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<Decimal> for SalePrice {
    fn from(raw: Decimal) -> Self {
        Self(raw)
    }
}

// SQLx support (with postgres feature): both types map to NUMERIC.
#[cfg(feature = "postgres")]
mod postgres_impls {
    use super::{Decimal, Price, SalePrice};

    macro_rules! decimal_codec {
        ($name:ident) => {
            impl sqlx::Type<sqlx::Postgres> for $name {
                fn type_info() -> sqlx::postgres::PgTypeInfo {
                    <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
                }

                fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                    <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
                }
            }

            impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
                fn decode(
                    value: sqlx::postgres::PgValueRef<'r>,
                ) -> Result<Self, sqlx::error::BoxDynError> {
                    let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                    Ok(Self(amount))
                }
            }

            impl sqlx::Encode<'_, sqlx::Postgres> for $name {
                fn encode_by_ref(
                    &self,
                    buf: &mut sqlx::postgres::PgArgumentBuffer,
                ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                    <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
                }
            }
        };
    }

    decimal_codec!(Price);
    decimal_codec!(SalePrice);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_price_arithmetic() {
        let unit = Price::new(dec!(19.99));
        assert_eq!(unit.times(3), Price::new(dec!(59.97)));
        assert_eq!(unit + Price::new(dec!(0.01)), Price::new(dec!(20.00)));

        let total: Price = [Price::from(100), Price::from(200)].into_iter().sum();
        assert_eq!(total, Price::from(300));
    }

    #[test]
    fn test_sale_price_sentinel() {
        assert_eq!(SalePrice::NONE.get(), None);
        assert_eq!(SalePrice::NONE.as_decimal(), dec!(-1));

        let sale = SalePrice::active(Price::new(dec!(49.00)));
        assert_eq!(sale.get(), Some(Price::new(dec!(49.00))));
    }

    #[test]
    fn test_sale_price_wire_format() {
        let json = serde_json::to_string(&SalePrice::NONE).unwrap();
        assert_eq!(json, "\"-1\"");

        let parsed: SalePrice = serde_json::from_str("\"-1\"").unwrap();
        assert_eq!(parsed.get(), None);
    }

    #[test]
    fn test_zero_sale_price_is_a_sale() {
        // 0 is a legitimate (if odd) sale price; only -1 means "no sale".
        let free: SalePrice = dec!(0).into();
        assert_eq!(free.get(), Some(Price::ZERO));
    }
}
