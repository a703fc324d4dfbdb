//! Integration tests for the bookstore storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookstore-integration-tests
//! ```
//!
//! No external services are needed: each test starts a stub catalog API and
//! the real storefront router on ephemeral local ports.
//!
//! # Harness
//!
//! - [`StubCatalog`] - what the fake products API answers
//! - [`TestContext`] - a running storefront plus a cookie-keeping client

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Router, http::StatusCode, routing::get};
use bookstore_storefront::config::{
    CatalogConfig, LogFormat, SentryConfig, StorefrontConfig,
};
use bookstore_storefront::state::AppState;
use tokio::net::TcpListener;
use url::Url;

/// Two-book catalog used by the scenarios.
pub const TWO_BOOKS: &str = r#"{
    "data": [
        {"pid": "p1", "name": "Book A", "genre": "Fiction", "price": 10,
         "taxRate": 0.07, "quantity": 1, "imageSrc": "https://img.example/a.jpg"},
        {"pid": "p2", "name": "Book B", "genre": "Poetry", "price": 20,
         "taxRate": 0.07, "quantity": 1, "imageSrc": "https://img.example/b.jpg"}
    ]
}"#;

/// Canned response of the stub products API.
#[derive(Debug, Clone)]
pub struct StubCatalog {
    pub status: StatusCode,
    pub body: String,
}

impl StubCatalog {
    /// Answer 200 with the given JSON body.
    #[must_use]
    pub fn ok(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
        }
    }

    /// Answer 200 with [`TWO_BOOKS`].
    #[must_use]
    pub fn two_books() -> Self {
        Self::ok(TWO_BOOKS)
    }

    /// Answer with an error status.
    #[must_use]
    pub fn failing(status: StatusCode) -> Self {
        Self {
            status,
            body: r#"{"error": "upstream failure"}"#.to_string(),
        }
    }
}

/// A running storefront wired to a stub catalog.
pub struct TestContext {
    /// Client with a cookie store, i.e. one browser session.
    pub client: reqwest::Client,
    /// Storefront base URL, without trailing slash.
    pub base_url: String,
    /// Number of requests the stub catalog has served.
    pub catalog_hits: Arc<AtomicUsize>,
}

impl TestContext {
    /// Start a storefront whose catalog is cached for the default lifetime.
    pub async fn start(stub: StubCatalog) -> Self {
        Self::start_with(stub, |_| {}).await
    }

    /// Start a storefront with an explicit catalog cache lifetime.
    pub async fn start_with_cache(stub: StubCatalog, cache_ttl: Duration) -> Self {
        Self::start_with(stub, |config| config.catalog.cache_ttl = cache_ttl).await
    }

    /// Start a storefront after adjusting the default test configuration.
    pub async fn start_with(stub: StubCatalog, configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let catalog_hits = Arc::new(AtomicUsize::new(0));
        let catalog_addr = spawn_stub_catalog(stub, Arc::clone(&catalog_hits)).await;

        let mut catalog = CatalogConfig::new(
            Url::parse(&format!("http://{catalog_addr}/api/products")).unwrap(),
        );
        catalog.timeout = Duration::from_secs(5);

        let mut config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_string(),
            static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
            catalog,
            session_expiry: Duration::from_secs(3600),
            max_sessions: 1_000,
            log_format: LogFormat::Text,
            sentry: SentryConfig::default(),
        };
        configure(&mut config);

        let state = AppState::new(config).unwrap();
        let app = bookstore_storefront::app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: new_client(),
            base_url: format!("http://{addr}"),
            catalog_hits,
        }
    }

    /// A second, independent browser session against the same server.
    #[must_use]
    pub fn new_session(&self) -> reqwest::Client {
        new_client()
    }

    /// `GET` a path in this session.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// `GET` a path as an HTMX request and return status and body.
    pub async fn get_fragment(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("HX-Request", "true")
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.text().await.unwrap())
    }

    /// `POST` a form as an HTMX request and return status and body.
    pub async fn post_fragment(&self, path: &str, form: &[(&str, &str)]) -> (StatusCode, String) {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.text().await.unwrap())
    }

    /// Add a product to the cart by `pid`.
    pub async fn add(&self, pid: &str) -> (StatusCode, String) {
        self.post_fragment("/cart/add", &[("pid", pid)]).await
    }

    /// Set the quantity of a cart line from raw input.
    pub async fn update(&self, id: u64, quantity: &str) -> (StatusCode, String) {
        let id = id.to_string();
        self.post_fragment("/cart/update", &[("id", id.as_str()), ("quantity", quantity)])
            .await
    }

    /// Remove a cart line.
    pub async fn remove(&self, id: u64) -> (StatusCode, String) {
        let id = id.to_string();
        self.post_fragment("/cart/remove", &[("id", id.as_str())])
            .await
    }

    /// Current cart panel HTML.
    pub async fn cart(&self) -> String {
        let (status, body) = self.get_fragment("/cart").await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    /// Requests served by the stub catalog so far.
    #[must_use]
    pub fn catalog_hits(&self) -> usize {
        self.catalog_hits.load(Ordering::SeqCst)
    }
}

fn new_client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

async fn spawn_stub_catalog(stub: StubCatalog, hits: Arc<AtomicUsize>) -> SocketAddr {
    let app = Router::new().route(
        "/api/products",
        get(move || {
            let stub = stub.clone();
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (
                    stub.status,
                    [("content-type", "application/json")],
                    stub.body,
                )
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// =============================================================================
// HTML inspection helpers
// =============================================================================

/// Number of product cards in a catalog fragment.
#[must_use]
pub fn card_count(html: &str) -> usize {
    html.matches(r#"<article class="card">"#).count()
}

/// Number of line rows in a cart fragment.
#[must_use]
pub fn line_count(html: &str) -> usize {
    html.matches(r#"<tr id="cart-line-"#).count()
}

/// Whether the cart fragment contains a line with this local identifier.
#[must_use]
pub fn has_line(html: &str, id: u64) -> bool {
    html.contains(&format!(r#"<tr id="cart-line-{id}">"#))
}

/// The displayed cart total.
#[must_use]
pub fn cart_total(html: &str) -> Option<String> {
    let marker = r#"<strong id="cart-total">"#;
    let start = html.find(marker)? + marker.len();
    let end = html.get(start..)?.find("</strong>")? + start;
    html.get(start..end).map(|s| s.trim().to_string())
}

/// The cart panel portion of a full page.
#[must_use]
pub fn cart_panel(html: &str) -> &str {
    let start = html.find(r#"<div id="cart""#).unwrap_or(0);
    let end = html
        .get(start..)
        .and_then(|rest| rest.find(r#"<section class="catalog-column""#))
        .map_or(html.len(), |offset| start + offset);
    html.get(start..end).unwrap_or(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_total_extraction() {
        let html = r#"<div><strong id="cart-total">25.50</strong></div>"#;
        assert_eq!(cart_total(html).as_deref(), Some("25.50"));
        assert_eq!(cart_total("<div></div>"), None);
    }

    #[test]
    fn test_line_helpers() {
        let html = r#"<tr id="cart-line-1"></tr><tr id="cart-line-3"></tr>"#;
        assert_eq!(line_count(html), 2);
        assert!(has_line(html, 3));
        assert!(!has_line(html, 2));
    }
}
