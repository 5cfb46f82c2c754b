//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are always non-negative. Anything that would produce a negative
//! amount (a bad remote record, a corrupted cart in storage) clamps to zero.
//! Arithmetic saturates at [`Decimal::MAX`] rather than overflowing.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative store price in the shop currency (US dollars).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, clamping negative amounts to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(amount.normalize())
        }
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self::new(Decimal::new(i64::from(cents), 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the price is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The price of `quantity` units, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// The amount saved relative to a previous (higher) price.
    ///
    /// Returns zero when `previous` is not above this price.
    #[must_use]
    pub fn savings_from(self, previous: Self) -> Self {
        Self::new(previous.0 - self.0)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Decimal::MAX`].
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Serializers writing a price as a JSON number, the shape stored product
/// documents use. Use with `#[serde(serialize_with = "...")]`.
pub mod number {
    use rust_decimal::prelude::ToPrimitive;
    use serde::Serializer;

    use super::Price;

    /// Serialize a price as a number.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(price: &Price, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(price.0.to_f64().unwrap_or_default())
    }

    /// Serialize an optional price as a number or null.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    #[allow(clippy::ref_option)]
    pub fn serialize_option<S: Serializer>(
        price: &Option<Price>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match price {
            Some(price) => serialize(price, serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_amount_clamps_to_zero() {
        assert_eq!(Price::new(Decimal::new(-500, 2)), Price::ZERO);
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_cents(1000).times(2), Price::from_cents(550)]
            .into_iter()
            .sum();
        assert_eq!(total.amount(), Decimal::new(255, 1));
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Price::new(Decimal::MAX);
        assert_eq!(huge.times(2), huge);
        assert_eq!(huge + Price::from_cents(1), huge);
        let total: Price = [huge, huge, Price::from_cents(100)].into_iter().sum();
        assert_eq!(total, huge);
        assert_eq!(Price::ZERO.times(u32::MAX), Price::ZERO);
    }

    #[test]
    fn test_number_serializer_writes_json_numbers() {
        #[derive(Serialize)]
        struct Doc {
            #[serde(serialize_with = "number::serialize")]
            price: Price,
            #[serde(serialize_with = "number::serialize_option")]
            previous: Option<Price>,
        }

        let json = serde_json::to_value(Doc {
            price: Price::from_cents(4990),
            previous: None,
        })
        .unwrap_or_default();
        assert_eq!(json["price"], 49.9);
        assert!(json["previous"].is_null());
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::from_cents(50).display(), "$0.50");
        assert_eq!(Price::new(Decimal::new(255, 1)).display(), "$25.50");
    }

    #[test]
    fn test_savings_never_negative() {
        let price = Price::from_cents(1500);
        assert_eq!(price.savings_from(Price::from_cents(2000)), Price::from_cents(500));
        assert_eq!(price.savings_from(Price::from_cents(1000)), Price::ZERO);
    }

    #[test]
    fn test_deserialize_negative_clamps() {
        let price: Price = serde_json::from_str("\"-3.00\"").unwrap_or_default();
        assert_eq!(price, Price::ZERO);
    }
}
