//! Session resolution for installed shops.
//!
//! OAuth installation is handled by the app's embedded admin layer, which
//! persists one credential bundle per shop. The proxy only ever reads those
//! bundles: it needs a shop's Admin API token to look orders up on the
//! shop's behalf, and nothing more.

mod postgres;

pub use postgres::{PgSessionStore, create_pool};

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use tracknest_core::ShopDomain;

/// Errors that can occur while resolving a session.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored Admin API credential bundle for one shop.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ApiSession {
    /// Shop domain the credentials belong to.
    pub shop: String,
    /// Admin API access token (HIGH PRIVILEGE - redacted in debug output).
    pub access_token: SecretString,
    /// Granted scopes, comma-separated as stored.
    pub scope: Option<String>,
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Read-only lookup of stored shop credentials.
///
/// The store is owned and written by the OAuth layer; this trait deliberately
/// exposes a single read operation so the handler can be tested against a
/// fake.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the credential bundle for a shop.
    ///
    /// # Errors
    ///
    /// Returns `SessionStoreError::Database` if the lookup fails.
    async fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<ApiSession>, SessionStoreError>;
}
