//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create sequential ID wrappers that cannot be
//! mixed up with one another, and [`ProductId`] for identifiers handed to us
//! by the upstream catalog.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe sequential ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_u64()`, `next()`
/// - `Display`, `From<u64>` and `Into<u64>` implementations
///
/// # Example
///
/// ```rust
/// # use bookstore_core::define_id;
/// define_id!(LineId);
/// define_id!(ReceiptId);
///
/// let line = LineId::new(1);
/// assert_eq!(line.next(), LineId::new(2));
///
/// // These are different types, so this won't compile:
/// // let _: LineId = ReceiptId::new(1);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            /// The ID that follows this one.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(LineId);

impl Default for LineId {
    /// Sessions number their cart lines from 1.
    fn default() -> Self {
        Self::new(1)
    }
}

/// Identifier of a catalog product, as issued by the upstream API (`pid`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap an upstream product identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_id_starts_at_one() {
        assert_eq!(LineId::default().as_u64(), 1);
    }

    #[test]
    fn test_line_id_next_is_strictly_greater() {
        let id = LineId::new(41);
        assert!(id.next() > id);
        assert_eq!(id.next().as_u64(), 42);
    }

    #[test]
    fn test_line_id_serde_transparent() {
        let json = serde_json::to_string(&LineId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_product_id_display() {
        let id = ProductId::from("p1");
        assert_eq!(id.to_string(), "p1");
        assert_eq!(id.as_str(), "p1");
    }
}
