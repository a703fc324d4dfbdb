//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Storefront page (catalog placeholder + cart)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog reachable)
//!
//! # Catalog (HTMX fragment)
//! GET  /catalog                - Product grid, or error panel on failure
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart panel
//! POST /cart/add               - Add product line (form: pid)
//! POST /cart/update            - Update quantity (form: id, quantity)
//! POST /cart/remove            - Remove line (form: id)
//! ```

pub mod cart;
pub mod catalog;
pub mod health;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/catalog", get(catalog::index))
        .nest("/cart", cart_routes())
        .nest("/health", health_routes())
}
