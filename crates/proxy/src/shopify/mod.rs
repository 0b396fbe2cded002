//! Shopify Admin API order lookup.
//!
//! # Architecture
//!
//! - One fixed GraphQL query against the Admin API, issued with `reqwest`
//! - Credentials come from the per-shop session store; every call is made on
//!   behalf of the shop the inbound request named
//! - Order data is fetched per request and never cached
//! - Failures surface as [`AdminError`]; the request handler decides the
//!   shopper-facing mapping and no upstream detail reaches a response body

mod admin;

pub use admin::AdminClient;

use async_trait::async_trait;
use thiserror::Error;

use tracknest_core::OrderNumber;

use crate::sessions::ApiSession;

/// Errors that can occur when interacting with the Admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A GraphQL error returned by the Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| {
            if e.path.is_empty() {
                e.message.clone()
            } else {
                let path = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                format!("{} (path: {path})", e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A fulfillment's carrier and tracking details.
///
/// Every field is optional on the platform side and passes through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFulfillment {
    /// Carrier name (e.g. "UPS").
    pub tracking_company: Option<String>,
    /// Carrier tracking number.
    pub tracking_number: Option<String>,
    /// Carrier tracking page URL.
    pub tracking_url: Option<String>,
}

/// An order with the fulfillment data the tracking endpoint exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOrder {
    /// Order GID.
    pub id: String,
    /// Display name (e.g. "#1001").
    pub name: String,
    /// Email the order was placed with.
    pub email: Option<String>,
    /// Fulfillments in creation order, oldest first.
    pub fulfillments: Vec<OrderFulfillment>,
}

/// Order lookup against the commerce platform.
///
/// Implemented by [`AdminClient`]; a trait so the request handler can be
/// tested without the network.
#[async_trait]
pub trait OrderLookup: Send + Sync {
    /// Fetch the first order matching the number and email, or `None`.
    ///
    /// Fulfillments come back in creation order (the API default). No
    /// retries: a transient upstream failure is an error here and the
    /// caller's generic error branch there.
    ///
    /// # Errors
    ///
    /// Returns `AdminError` on transport failure, a non-success status, or a
    /// GraphQL-level error.
    async fn find_order(
        &self,
        session: &ApiSession,
        order_number: &OrderNumber,
        email: &str,
    ) -> Result<Option<TrackedOrder>, AdminError>;
}
