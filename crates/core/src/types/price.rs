//! Decimal prices.
//!
//! Catalog prices arrive as JSON numbers. They are held as [`Decimal`] so that
//! line subtotals and cart totals are exact; rounding to two places happens only
//! when a price is formatted for display. Negative amounts are rejected when
//! a price is deserialized.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::Quantity;

/// Rejected price amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price must not be negative, got {0}")]
    Negative(Decimal),
}

/// A non-negative amount in the store's currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The exact, unrounded amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display with exactly two decimal places (e.g. `25.50`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Quantity> for Price {
    type Output = Self;

    fn mul(self, rhs: Quantity) -> Self {
        Self(self.0 * Decimal::from(rhs.get()))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::new(Decimal::from(20)).display(), "20.00");
        assert_eq!(Price::from_cents(550).display(), "5.50");
    }

    #[test]
    fn test_display_rounds_only_at_presentation() {
        let price = Price::new(Decimal::new(19_995, 3));
        assert_eq!(price.display(), "20.00");
        assert_eq!(price.amount(), Decimal::new(19_995, 3));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let qty = Quantity::new(3).unwrap();
        assert_eq!(Price::from_cents(1_050) * qty, Price::from_cents(3_150));
    }

    #[test]
    fn test_sum_is_exact() {
        let total: Price = [Price::from_cents(10), Price::from_cents(20)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(30));
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("5.5").unwrap();
        assert_eq!(price, Price::from_cents(550));

        let price: Price = serde_json::from_str("10").unwrap();
        assert_eq!(price.display(), "10.00");

        let price: Price = serde_json::from_str("0").unwrap();
        assert_eq!(price, Price::ZERO);
    }

    #[test]
    fn test_negative_price_is_rejected() {
        assert!(serde_json::from_str::<Price>("-1.50").is_err());
        assert_eq!(
            Price::try_from(Decimal::new(-150, 2)),
            Err(PriceError::Negative(Decimal::new(-150, 2)))
        );
    }
}
