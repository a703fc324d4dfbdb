//! Catalog products and the catalog load lifecycle.
//!
//! The catalog is fetched from the upstream API as `{ "data": [Product] }`.
//! Loading is modelled as an explicit state machine so that a failed load is a
//! state the page can render rather than an error nobody handles.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Price, ProductId};

/// A read-only catalog entry as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Upstream product identifier.
    pub pid: ProductId,
    /// Display name.
    pub name: String,
    /// Genre / category.
    #[serde(default)]
    pub genre: String,
    /// Unit price.
    pub price: Price,
    /// Tax rate. Carried for display, not used in totals.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Quantity on the product record; seeds the initial line quantity.
    ///
    /// Any JSON number is accepted. Fractions are truncated, negatives become 0.
    #[serde(default, deserialize_with = "stock_quantity")]
    pub quantity: u32,
    /// Image URL.
    #[serde(default)]
    pub image_src: String,
}

fn stock_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.trunc().max(Decimal::ZERO).to_u32().unwrap_or(u32::MAX))
}

/// Response body of the catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogResponse {
    pub data: Vec<Product>,
}

/// Why the catalog could not be loaded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogLoadError {
    /// The request never produced a response (DNS, connect, timeout...).
    #[error("catalog request failed: {0}")]
    Transport(String),
    /// The upstream answered with a non-success status.
    #[error("catalog returned HTTP {0}")]
    Status(u16),
    /// The body was not the expected `{ data: [...] }` shape.
    #[error("catalog response was malformed: {0}")]
    Malformed(String),
}

/// Lifecycle of the catalog for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    /// Page not mounted yet.
    #[default]
    NotStarted,
    /// A load is in flight.
    Loading,
    /// Products are available.
    Loaded(Vec<Product>),
    /// The load failed; no products are shown.
    Failed(CatalogLoadError),
}

impl CatalogState {
    /// Mark a load as started.
    ///
    /// Only a page that has not started, or whose previous load failed, moves
    /// to `Loading`. A loaded catalog is never reloaded.
    pub fn begin(&mut self) -> bool {
        match self {
            Self::NotStarted | Self::Failed(_) => {
                *self = Self::Loading;
                true
            }
            Self::Loading | Self::Loaded(_) => false,
        }
    }

    /// Record the outcome of the in-flight load.
    ///
    /// On success the product list is replaced wholesale. Completing a state
    /// that is not `Loading` is ignored.
    pub fn complete(&mut self, outcome: Result<Vec<Product>, CatalogLoadError>) {
        if !matches!(self, Self::Loading) {
            return;
        }
        *self = match outcome {
            Ok(products) => Self::Loaded(products),
            Err(err) => Self::Failed(err),
        };
    }

    /// Build the state resulting from a single load.
    #[must_use]
    pub fn from_outcome(outcome: Result<Vec<Product>, CatalogLoadError>) -> Self {
        let mut state = Self::NotStarted;
        state.begin();
        state.complete(outcome);
        state
    }

    /// Products to render. Empty unless the catalog is loaded.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Loaded(products) => products,
            _ => &[],
        }
    }

    /// Look up a loaded product by its upstream identifier.
    #[must_use]
    pub fn find(&self, pid: &ProductId) -> Option<&Product> {
        self.products().iter().find(|p| &p.pid == pid)
    }

    /// The load error, if the last load failed.
    #[must_use]
    pub const fn error(&self) -> Option<&CatalogLoadError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": [
            {"pid": "p1", "name": "Book A", "genre": "Fiction", "price": 10,
             "taxRate": 0.07, "quantity": 1, "imageSrc": "https://img.example/a.jpg"},
            {"pid": "p2", "name": "Book B", "genre": "Poetry", "price": 20,
             "taxRate": 0.07, "quantity": 1, "imageSrc": "https://img.example/b.jpg"}
        ]
    }"#;

    fn sample_products() -> Vec<Product> {
        serde_json::from_str::<CatalogResponse>(SAMPLE).unwrap().data
    }

    #[test]
    fn test_parse_catalog_response() {
        let products = sample_products();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].pid, ProductId::from("p1"));
        assert_eq!(products[0].name, "Book A");
        assert_eq!(products[0].genre, "Fiction");
        assert_eq!(products[0].price, Price::from_cents(1_000));
        assert_eq!(products[0].tax_rate, Decimal::new(7, 2));
        assert_eq!(products[1].image_src, "https://img.example/b.jpg");
    }

    #[test]
    fn test_parse_tolerates_missing_optional_fields() {
        let json = r#"{"data": [{"pid": "p9", "name": "Bare", "price": 1.25}]}"#;
        let products = serde_json::from_str::<CatalogResponse>(json).unwrap().data;
        assert_eq!(products[0].quantity, 0);
        assert!(products[0].image_src.is_empty());
    }

    #[test]
    fn test_quantity_accepts_any_number() {
        let parse = |quantity: &str| {
            let json = format!(r#"{{"pid": "p1", "name": "A", "price": 1, "quantity": {quantity}}}"#);
            serde_json::from_str::<Product>(&json).unwrap().quantity
        };
        assert_eq!(parse("3"), 3);
        assert_eq!(parse("1.0"), 1);
        assert_eq!(parse("2.7"), 2);
        assert_eq!(parse("-1"), 0);
        assert_eq!(parse("null"), 0);
        assert_eq!(parse("1e12"), u32::MAX);
    }

    #[test]
    fn test_negative_price_makes_catalog_malformed() {
        let json = r#"{"data": [{"pid": "p1", "name": "A", "price": -5}]}"#;
        assert!(serde_json::from_str::<CatalogResponse>(json).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        assert!(serde_json::from_str::<CatalogResponse>(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_lifecycle_success() {
        let mut state = CatalogState::default();
        assert!(state.products().is_empty());

        assert!(state.begin());
        assert!(state.is_loading());

        state.complete(Ok(sample_products()));
        assert_eq!(state.products().len(), 2);
        assert!(state.error().is_none());
    }

    #[test]
    fn test_lifecycle_failure_renders_nothing() {
        let state = CatalogState::from_outcome(Err(CatalogLoadError::Status(500)));
        assert!(state.products().is_empty());
        assert_eq!(state.error(), Some(&CatalogLoadError::Status(500)));
    }

    #[test]
    fn test_failed_load_can_be_retried() {
        let mut state = CatalogState::from_outcome(Err(CatalogLoadError::Status(503)));
        assert!(state.begin());
        state.complete(Ok(sample_products()));
        assert_eq!(state.products().len(), 2);
    }

    #[test]
    fn test_loaded_catalog_is_not_reloaded() {
        let mut state = CatalogState::from_outcome(Ok(sample_products()));
        assert!(!state.begin());
        state.complete(Ok(Vec::new()));
        assert_eq!(state.products().len(), 2);
    }

    #[test]
    fn test_find_by_pid() {
        let state = CatalogState::from_outcome(Ok(sample_products()));
        let found = state.find(&ProductId::from("p2")).unwrap();
        assert_eq!(found.name, "Book B");
        assert!(state.find(&ProductId::from("missing")).is_none());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CatalogLoadError::Status(500).to_string(),
            "catalog returned HTTP 500"
        );
    }
}
