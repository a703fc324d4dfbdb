//! Cart line quantity.

use core::fmt;
use core::num::NonZeroU32;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input string is empty.
    #[error("quantity cannot be empty")]
    Empty,
    /// The input is not a whole number.
    #[error("quantity must be a whole number")]
    NotANumber,
    /// The input is zero or negative.
    #[error("quantity must be at least {min}")]
    TooSmall {
        /// Minimum allowed quantity.
        min: u32,
    },
    /// The input exceeds the per-line limit.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// A validated cart line quantity.
///
/// ## Constraints
///
/// - Whole number between 1 and [`Quantity::MAX`] inclusive
///
/// ## Examples
///
/// ```
/// use bookstore_core::Quantity;
///
/// assert!(Quantity::parse("3").is_ok());
/// assert!(Quantity::parse(" 12 ").is_ok());
///
/// assert!(Quantity::parse("").is_err());    // empty
/// assert!(Quantity::parse("abc").is_err()); // not a number
/// assert!(Quantity::parse("0").is_err());   // below minimum
/// assert!(Quantity::parse("-2").is_err());  // below minimum
/// assert!(Quantity::parse("1.5").is_err()); // not whole
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Smallest quantity a line can hold.
    pub const MIN: u32 = 1;
    /// Largest quantity a line can hold.
    pub const MAX: u32 = 9_999;
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity from an integer.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is zero or above [`Quantity::MAX`].
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(QuantityError::TooSmall { min: Self::MIN })
    }

    /// Create a quantity, clamping out-of-range values into `1..=MAX`.
    #[must_use]
    pub fn clamped(value: u32) -> Self {
        Self::new(value.clamp(Self::MIN, Self::MAX)).unwrap_or(Self::ONE)
    }

    /// Parse a quantity from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty or only whitespace
    /// - Is not a whole number
    /// - Is zero or negative
    /// - Is larger than [`Quantity::MAX`]
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::Empty);
        }

        let value: i64 = trimmed.parse().map_err(|_| QuantityError::NotANumber)?;
        if value < i64::from(Self::MIN) {
            return Err(QuantityError::TooSmall { min: Self::MIN });
        }

        u32::try_from(value)
            .map_err(|_| QuantityError::TooLarge { max: Self::MAX })
            .and_then(Self::new)
    }

    /// Returns the quantity as an integer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Quantity::parse("1").unwrap().get(), 1);
        assert_eq!(Quantity::parse("  42\n").unwrap().get(), 42);
        assert_eq!(Quantity::parse("9999").unwrap().get(), 9_999);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Quantity::parse(""), Err(QuantityError::Empty));
        assert_eq!(Quantity::parse("   "), Err(QuantityError::Empty));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Quantity::parse("NaN"), Err(QuantityError::NotANumber));
        assert_eq!(Quantity::parse("2.5"), Err(QuantityError::NotANumber));
        assert_eq!(Quantity::parse("two"), Err(QuantityError::NotANumber));
    }

    #[test]
    fn test_parse_zero_and_negative() {
        assert_eq!(
            Quantity::parse("0"),
            Err(QuantityError::TooSmall { min: 1 })
        );
        assert_eq!(
            Quantity::parse("-3"),
            Err(QuantityError::TooSmall { min: 1 })
        );
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(
            Quantity::parse("10000"),
            Err(QuantityError::TooLarge { max: 9_999 })
        );
        assert_eq!(
            Quantity::parse("99999999999"),
            Err(QuantityError::TooLarge { max: 9_999 })
        );
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Quantity::clamped(0), Quantity::ONE);
        assert_eq!(Quantity::clamped(5).get(), 5);
        assert_eq!(Quantity::clamped(u32::MAX).get(), Quantity::MAX);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().get(), 2);
    }
}
