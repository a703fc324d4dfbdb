//! Storefront page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use bookstore_core::CatalogState;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::cart::{CartView, load_cart};
use crate::routes::catalog::CatalogView;
use crate::state::AppState;

/// Storefront page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub catalog: CatalogView,
    pub cart: CartView,
}

/// Display the storefront page.
///
/// Mounting the page starts the catalog load: the grid is rendered in its
/// loading state and fetched by the browser as a fragment.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let mut catalog = CatalogState::default();
    catalog.begin();

    let cart = load_cart(&state, &session).await?;

    Ok(HomeTemplate {
        catalog: CatalogView::from(&catalog),
        cart: CartView::from(&cart),
    })
}
