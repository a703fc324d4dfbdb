//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults are shown in parentheses.
//!
//! - `BOOKSTORE_HOST` - Bind address (127.0.0.1)
//! - `BOOKSTORE_PORT` - Listen port (3000)
//! - `BOOKSTORE_BASE_URL` - Public URL for the storefront (<http://localhost:3000>)
//! - `BOOKSTORE_STATIC_DIR` - Static asset directory (crates/storefront/static)
//! - `BOOKSTORE_CATALOG_URL` - Product API endpoint (<https://q06-book.vercel.app/api/products>)
//! - `BOOKSTORE_CATALOG_TIMEOUT_SECS` - Product API request timeout (10)
//! - `BOOKSTORE_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime, 0 disables (300)
//! - `BOOKSTORE_SESSION_EXPIRY_SECS` - Session inactivity expiry (604800)
//! - `BOOKSTORE_MAX_SESSIONS` - Sessions (and carts) held in memory (100000)
//! - `BOOKSTORE_LOG_FORMAT` - `text` or `json` (text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default upstream product API.
pub const DEFAULT_CATALOG_URL: &str = "https://q06-book.vercel.app/api/products";

/// Session expiry time in seconds (7 days).
const DEFAULT_SESSION_EXPIRY_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Default cap on sessions held in memory.
const DEFAULT_MAX_SESSIONS: u64 = 100_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Product catalog API configuration
    pub catalog: CatalogConfig,
    /// Session inactivity expiry
    pub session_expiry: Duration,
    /// Upper bound on live sessions; least recently used are evicted first
    pub max_sessions: u64,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Upstream product catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Endpoint returning `{ "data": [Product] }`
    pub url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long a successful load is reused; zero disables caching
    pub cache_ttl: Duration,
}

/// Sentry configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; error tracking is off when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. "production")
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance transaction sample rate
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("BOOKSTORE_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("BOOKSTORE_PORT", "3000")?;
        let base_url = get_env_or_default("BOOKSTORE_BASE_URL", "http://localhost:3000");
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("BOOKSTORE_BASE_URL".to_string(), e.to_string())
        })?;
        let static_dir = PathBuf::from(get_env_or_default(
            "BOOKSTORE_STATIC_DIR",
            "crates/storefront/static",
        ));
        let session_expiry = Duration::from_secs(parse_env_or_default(
            "BOOKSTORE_SESSION_EXPIRY_SECS",
            &DEFAULT_SESSION_EXPIRY_SECONDS.to_string(),
        )?);
        let max_sessions = parse_env_or_default(
            "BOOKSTORE_MAX_SESSIONS",
            &DEFAULT_MAX_SESSIONS.to_string(),
        )?;
        let log_format = parse_env_or_default("BOOKSTORE_LOG_FORMAT", "text")?;

        Ok(Self {
            host,
            port,
            base_url,
            static_dir,
            catalog: CatalogConfig::from_env()?,
            session_expiry,
            max_sessions,
            log_format,
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CatalogConfig {
    /// Build a catalog configuration for an endpoint with default timings.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_env_or_default("BOOKSTORE_CATALOG_URL", DEFAULT_CATALOG_URL)?,
            timeout: Duration::from_secs(parse_env_or_default(
                "BOOKSTORE_CATALOG_TIMEOUT_SECS",
                "10",
            )?),
            cache_ttl: Duration::from_secs(parse_env_or_default(
                "BOOKSTORE_CATALOG_CACHE_TTL_SECS",
                "300",
            )?),
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            static_dir: PathBuf::from("static"),
            catalog: CatalogConfig::new(Url::parse(DEFAULT_CATALOG_URL).unwrap()),
            session_expiry: Duration::from_secs(DEFAULT_SESSION_EXPIRY_SECONDS),
            max_sessions: DEFAULT_MAX_SESSIONS,
            log_format: LogFormat::Text,
            sentry: SentryConfig::default(),
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        let mut config = test_config();
        assert!(!config.is_secure());

        config.base_url = "https://books.example.com".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_parse_value_port() {
        let port: u16 = parse_value("BOOKSTORE_PORT", " 8080 ").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_value_invalid_port() {
        let err = parse_value::<u16>("BOOKSTORE_PORT", "99999").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BOOKSTORE_PORT"));
    }

    #[test]
    fn test_parse_value_catalog_url() {
        let url: Url = parse_value("BOOKSTORE_CATALOG_URL", DEFAULT_CATALOG_URL).unwrap();
        assert_eq!(url.host_str(), Some("q06-book.vercel.app"));

        assert!(parse_value::<Url>("BOOKSTORE_CATALOG_URL", "not a url").is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_catalog_config_defaults() {
        let config = CatalogConfig::new(Url::parse("http://127.0.0.1:9/products").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }
}
