//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The session carries the visitor's [`CartId`]; every mutation applies one
//! [`CartCommand`] to that cart in the [`CartStore`](crate::cart_store::CartStore)
//! and re-renders the cart panel. Plain form posts (no `HX-Request` header)
//! are redirected back to the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use bookstore_core::{
    CartCommand, CartEvent, CartLineItem, CartState, CatalogState, LineId, ProductId, Quantity,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart_store::CartId;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// HTMX event fired after every cart mutation.
pub const CART_UPDATED_TRIGGER: &str = "cart-updated";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: u64,
    pub pid: String,
    pub name: String,
    pub genre: String,
    pub image_url: Option<String>,
    pub price: String,
    pub quantity: u32,
    pub subtotal: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        let image_url = Some(line.product.image_src.clone()).filter(|url| !url.is_empty());
        Self {
            id: line.id.as_u64(),
            pid: line.pid().to_string(),
            name: line.product.name.clone(),
            genre: line.product.genre.clone(),
            image_url,
            price: line.product.price.display(),
            quantity: line.quantity.get(),
            subtotal: line.subtotal().display(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The visitor's cart id, if they have a cart.
async fn session_cart_id(session: &Session) -> Result<Option<CartId>> {
    Ok(session.get::<CartId>(session_keys::CART_ID).await?)
}

/// Get the visitor's cart, or a new empty cart.
pub async fn load_cart(state: &AppState, session: &Session) -> Result<CartState> {
    Ok(match session_cart_id(session).await? {
        Some(id) => state.carts().snapshot(id).await,
        None => CartState::new(),
    })
}

/// Apply one command to the visitor's cart.
///
/// A cart (and its id in the session) is only created by an add; removing or
/// updating without a cart changes nothing.
async fn dispatch(
    state: &AppState,
    session: &Session,
    command: CartCommand,
) -> Result<(CartState, CartEvent)> {
    let id = match session_cart_id(session).await? {
        Some(id) => id,
        None if matches!(command, CartCommand::Add(_)) => {
            let id = CartId::new();
            session.insert(session_keys::CART_ID, id).await?;
            id
        }
        None => return Ok((CartState::new(), CartEvent::Unchanged)),
    };

    let (cart, event) = state.carts().apply(id, command).await;
    tracing::debug!(%id, ?event, lines = cart.line_count(), "Cart command applied");
    Ok((cart, event))
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Render the cart panel for HTMX, or send plain form posts back to the page.
fn cart_response(headers: &HeaderMap, cart: &CartState) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/").into_response();
    }

    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_TRIGGER)]),
        CartPanelTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub pid: String,
}

/// Update quantity form data.
///
/// `quantity` is taken as raw text so that invalid input gets a proper
/// validation error instead of a generic form rejection.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: u64,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: u64,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Display the cart panel.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartPanelTemplate> {
    let cart = load_cart(&state, &session).await?;
    Ok(CartPanelTemplate {
        cart: CartView::from(&cart),
    })
}

/// Add a catalog product to the cart as a new line.
///
/// The product is looked up in the current catalog by `pid`; the line stores
/// a snapshot of it.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let pid = ProductId::new(form.pid);
    let catalog = CatalogState::from_outcome(Ok(state.catalog().load().await?));
    let product = catalog
        .find(&pid)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {pid}")))?;

    let (cart, event) = dispatch(&state, &session, CartCommand::Add(product)).await?;
    if let CartEvent::Added(line_id) = event {
        tracing::info!(%pid, %line_id, "Added to cart");
        let line = line_id.to_string();
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("pid", pid.as_str()), ("line_id", line.as_str())]),
        );
    }

    Ok(cart_response(&headers, &cart))
}

/// Replace the quantity of a cart line.
///
/// Invalid quantities are rejected with 422 and the cart is not modified.
/// Unknown line identifiers leave the cart unchanged.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let quantity = Quantity::parse(&form.quantity).inspect_err(|e| {
        tracing::debug!(line_id = form.id, input = %form.quantity, error = %e, "Rejected quantity");
    })?;

    let line_id = LineId::new(form.id);
    let (cart, event) = dispatch(
        &state,
        &session,
        CartCommand::UpdateQuantity(line_id, quantity),
    )
    .await?;
    if event == CartEvent::QuantityUpdated(line_id) {
        let line = line_id.to_string();
        let quantity = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Updated quantity",
            Some(&[("line_id", line.as_str()), ("quantity", quantity.as_str())]),
        );
    }

    Ok(cart_response(&headers, &cart))
}

/// Remove a cart line. Removing a line that is already gone is not an error.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let line_id = LineId::new(form.id);
    let (cart, event) = dispatch(&state, &session, CartCommand::Remove(line_id)).await?;
    if event == CartEvent::Removed(line_id) {
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("line_id", line_id.to_string().as_str())]),
        );
    }

    Ok(cart_response(&headers, &cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use bookstore_core::{Price, Product};

    use super::*;

    fn product(pid: &str, cents: i64) -> Product {
        Product {
            pid: ProductId::from(pid),
            name: format!("Book {pid}"),
            genre: "Poetry".to_string(),
            price: Price::from_cents(cents),
            tax_rate: Default::default(),
            quantity: 1,
            image_src: String::new(),
        }
    }

    #[test]
    fn test_cart_view_formats_two_decimals() {
        let mut cart = CartState::new();
        let id = cart.add(product("p1", 1_000));
        cart.update_quantity(id, Quantity::new(2).unwrap());
        cart.add(product("p2", 550));

        let view = CartView::from(&cart);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].subtotal, "20.00");
        assert_eq!(view.items[1].price, "5.50");
        assert_eq!(view.total, "25.50");
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&CartState::new());
        assert!(view.items.is_empty());
        assert_eq!(view.total, "0.00");
    }

    #[test]
    fn test_missing_image_is_none() {
        let mut cart = CartState::new();
        cart.add(product("p1", 100));
        assert!(CartView::from(&cart).items[0].image_url.is_none());
    }

    #[test]
    fn test_panel_renders_count_genre_and_pid() {
        let mut cart = CartState::new();
        let id = cart.add(product("p1", 1_000));
        cart.update_quantity(id, Quantity::new(2).unwrap());
        cart.add(product("p2", 550));

        let html = CartPanelTemplate {
            cart: CartView::from(&cart),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"<span id="cart-count">3</span>"#));
        assert!(html.contains(r#"data-pid="p2""#));
        assert!(html.contains(r#"<small class="cart-genre">Poetry</small>"#));
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));

        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_plain_post_redirects_home() {
        let response = cart_response(&HeaderMap::new(), &CartState::new());
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/");
    }

    #[test]
    fn test_htmx_post_triggers_cart_updated() {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        let response = cart_response(&headers, &CartState::new());
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            CART_UPDATED_TRIGGER
        );
    }
}
