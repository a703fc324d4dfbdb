//! Cache types for catalog API responses.

use bookstore_core::Product;

/// Cache key for catalog responses.
///
/// The upstream exposes a single unpaginated list, so there is only one key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
}
