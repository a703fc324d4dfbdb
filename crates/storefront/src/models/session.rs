//! Session-related types.
//!
//! The session holds only the visitor's cart id; carts live in
//! [`crate::cart_store::CartStore`].

/// Session keys for storefront data.
pub mod keys {
    /// Key for the visitor's cart id (`CartId`).
    pub const CART_ID: &str = "cart_id";
}
