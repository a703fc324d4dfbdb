//! Product catalog API client.
//!
//! # Architecture
//!
//! - Plain `GET` against the configured endpoint, expecting `{ "data": [...] }`
//! - The upstream is the source of truth - nothing is persisted locally
//! - Successful loads are cached in memory via `moka`; failures are never cached
//!
//! Every failure (transport, non-success status, malformed body) is reported
//! as a [`CatalogLoadError`] so the page can render it as a catalog state.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookstore_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let products = client.load().await?;
//! ```

mod cache;

use std::sync::Arc;

use bookstore_core::{CatalogLoadError, CatalogResponse, Product};
use moka::future::Cache;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};

/// Maximum number of response body characters written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the upstream product catalog.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    endpoint: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                endpoint: config.url.clone(),
                cache,
            }),
        })
    }

    /// The endpoint this client loads from.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Load the full product list.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogLoadError`] if the request fails, the upstream
    /// answers with a non-success status, or the body is not a catalog.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn load(&self) -> Result<Vec<Product>, CatalogLoadError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Products(products)) = cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products = self.fetch().await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(CacheKey::Catalog, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    async fn fetch(&self) -> Result<Vec<Product>, CatalogLoadError> {
        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Catalog request failed");
                CatalogLoadError::Transport(e.to_string())
            })?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response
            .text()
            .await
            .map_err(|e| CatalogLoadError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text),
                "Catalog API returned non-success status"
            );
            return Err(CatalogLoadError::Status(status.as_u16()));
        }

        let response: CatalogResponse = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text),
                "Failed to parse catalog response"
            );
            CatalogLoadError::Malformed(e.to_string())
        })?;

        debug!(count = response.data.len(), "Catalog loaded");
        Ok(response.data)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
