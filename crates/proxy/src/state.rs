//! Shared application state.

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::sessions::SessionStore;
use crate::shopify::OrderLookup;

/// State handed to every handler; cloning bumps one `Arc`.
///
/// Both collaborators sit behind trait objects so the handler tests can swap
/// in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: ProxyConfig,
    sessions: Arc<dyn SessionStore>,
    orders: Arc<dyn OrderLookup>,
}

impl AppState {
    /// Bundle the configuration and collaborators into shared state.
    #[must_use]
    pub fn new(
        config: ProxyConfig,
        sessions: Arc<dyn SessionStore>,
        orders: Arc<dyn OrderLookup>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                sessions,
                orders,
            }),
        }
    }

    /// Proxy configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    /// Session store resolving shop credentials.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.inner.sessions.as_ref()
    }

    /// Order lookup client.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderLookup {
        self.inner.orders.as_ref()
    }
}
