//! Proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PROXY_DATABASE_URL` - `PostgreSQL` connection string for the session
//!   store (falls back to `DATABASE_URL`)
//! - `PROXY_BASE_URL` - Public URL the app is served from
//! - `SHOPIFY_API_SECRET` - App client secret; proxy signatures are checked
//!   against it
//!
//! ## Optional
//! - `PROXY_HOST` - Bind address (default: 127.0.0.1)
//! - `PROXY_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2026-01)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Proxy application configuration, immutable once loaded.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// `PostgreSQL` connection URL for the session store (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL the app is served from
    pub base_url: String,
    /// Shopify app configuration
    pub shopify: ShopifyProxyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shopify app configuration.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct ShopifyProxyConfig {
    /// App client secret; the platform signs proxied requests with it
    pub api_secret: SecretString,
    /// Admin API version (e.g., 2026-01)
    pub api_version: String,
}

impl std::fmt::Debug for ShopifyProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyProxyConfig")
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables, reading a `.env` file
    /// first if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: database_url_from_env()?,
            host: parsed_env("PROXY_HOST", "127.0.0.1")?,
            port: parsed_env("PROXY_PORT", "3000")?,
            base_url: require_env("PROXY_BASE_URL")?,
            shopify: ShopifyProxyConfig::from_env()?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyProxyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_secret: require_env("SHOPIFY_API_SECRET").map(SecretString::from)?,
            api_version: env_or("SHOPIFY_API_VERSION", "2026-01"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable and parse it, falling back to a default
/// that is known to parse.
fn parsed_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// The session store's connection URL, with a bare `DATABASE_URL` (managed
/// postgres attach) accepted as a fallback.
fn database_url_from_env() -> Result<SecretString, ConfigError> {
    std::env::var("PROXY_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar("PROXY_DATABASE_URL".to_string()))
}
