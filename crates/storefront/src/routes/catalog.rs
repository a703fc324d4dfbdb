//! Catalog route handlers.
//!
//! The storefront page renders the catalog in its `Loading` state and the
//! browser then requests this fragment once. A failed load renders an error
//! panel with a retry control instead of product cards.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use bookstore_core::{CatalogState, Product};
use tracing::instrument;

use crate::state::AppState;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub pid: String,
    pub name: String,
    pub genre: String,
    pub price: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            pid: product.pid.to_string(),
            name: product.name.clone(),
            genre: product.genre.clone(),
            price: product.price.display(),
            image_url: Some(product.image_src.clone()).filter(|url| !url.is_empty()),
        }
    }
}

/// Catalog display data for templates.
#[derive(Clone)]
pub struct CatalogView {
    pub loading: bool,
    pub products: Vec<ProductView>,
    pub error: Option<String>,
}

impl From<&CatalogState> for CatalogView {
    fn from(state: &CatalogState) -> Self {
        Self {
            loading: state.is_loading(),
            products: state.products().iter().map(ProductView::from).collect(),
            error: state
                .error()
                .map(|_| "The product catalog could not be loaded.".to_string()),
        }
    }
}

/// Catalog grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/catalog.html")]
pub struct CatalogTemplate {
    pub catalog: CatalogView,
}

/// Load the catalog and render the product grid.
///
/// Always answers 200 so HTMX swaps the error panel in on failure.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> CatalogTemplate {
    let catalog = CatalogState::from_outcome(state.catalog().load().await);

    if let Some(err) = catalog.error() {
        tracing::warn!(error = %err, "Catalog unavailable");
    } else {
        tracing::debug!(count = catalog.products().len(), "Catalog rendered");
    }

    CatalogTemplate {
        catalog: CatalogView::from(&catalog),
    }
}
