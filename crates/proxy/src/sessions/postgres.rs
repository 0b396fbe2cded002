//! `PostgreSQL`-backed session store.
//!
//! Reads the `shopify_sessions` table the OAuth layer's session storage
//! creates and maintains. The table schema (camel-cased column names
//! included) belongs to that layer, which is why the queries here use sqlx's
//! runtime API instead of compile-time checked macros, and why this crate
//! ships no migrations for it.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use tracknest_core::ShopDomain;

use super::{ApiSession, SessionStore, SessionStoreError};

/// Offline (shop-level) credentials for a shop, skipping rows that have
/// already expired. Online rows belong to per-user admin sessions and carry
/// the wrong token for background API access.
const FIND_OFFLINE_SESSION: &str = r#"
SELECT shop, "accessToken" AS access_token, scope
FROM shopify_sessions
WHERE shop = $1
  AND "isOnline" = false
  AND (expires IS NULL OR expires > now())
LIMIT 1
"#;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    shop: String,
    access_token: String,
    scope: Option<String>,
}

impl From<SessionRow> for ApiSession {
    fn from(row: SessionRow) -> Self {
        Self {
            shop: row.shop,
            access_token: SecretString::from(row.access_token),
            scope: row.scope,
        }
    }
}

/// Session store reading the OAuth layer's `shopify_sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find_by_shop(
        &self,
        shop: &ShopDomain,
    ) -> Result<Option<ApiSession>, SessionStoreError> {
        let row = sqlx::query_as::<_, SessionRow>(FIND_OFFLINE_SESSION)
            .bind(shop.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ApiSession::from))
    }
}
