//! Admin GraphQL API client.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use tracknest_core::OrderNumber;

use crate::config::ShopifyProxyConfig;
use crate::sessions::ApiSession;

use super::{AdminError, GraphQLError, OrderFulfillment, OrderLookup, TrackedOrder};

/// Fetch the first order matching a search filter, with its first
/// fulfillment's tracking fields. Fulfillments come back in creation order,
/// so the one requested is the oldest.
const ORDER_TRACKING_QUERY: &str = r"
query OrderTracking($query: String!) {
  orders(first: 1, query: $query) {
    edges {
      node {
        id
        name
        email
        fulfillments(first: 1) {
          edges {
            node {
              trackingCompany
              trackingNumber
              trackingUrl
            }
          }
        }
      }
    }
  }
}
";

/// Client for the Admin GraphQL API.
///
/// Holds no credentials of its own: every call is made with the session of
/// the shop the inbound request named, against that shop's endpoint.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_version: String,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

// =============================================================================
// Response data for ORDER_TRACKING_QUERY
// =============================================================================

#[derive(Debug, Deserialize)]
struct OrderTrackingData {
    orders: OrderConnection,
}

#[derive(Debug, Deserialize)]
struct OrderConnection {
    edges: Vec<OrderEdge>,
}

#[derive(Debug, Deserialize)]
struct OrderEdge {
    node: OrderNode,
}

#[derive(Debug, Deserialize)]
struct OrderNode {
    id: String,
    name: String,
    email: Option<String>,
    fulfillments: FulfillmentConnection,
}

#[derive(Debug, Deserialize)]
struct FulfillmentConnection {
    edges: Vec<FulfillmentEdge>,
}

#[derive(Debug, Deserialize)]
struct FulfillmentEdge {
    node: FulfillmentNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FulfillmentNode {
    tracking_company: Option<String>,
    tracking_number: Option<String>,
    tracking_url: Option<String>,
}

impl AdminClient {
    /// Create a new Admin API client.
    #[must_use]
    pub fn new(config: &ShopifyProxyConfig) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                api_version: config.api_version.clone(),
            }),
        }
    }

    /// Execute a GraphQL query on behalf of a shop.
    async fn execute<T: DeserializeOwned>(
        &self,
        session: &ApiSession,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, AdminError> {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            session.shop, self.inner.api_version
        );

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header(
                "X-Shopify-Access-Token",
                session.access_token.expose_secret(),
            )
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                status = %status,
                shop = %session.shop,
                "Admin API returned non-success status"
            );
            return Err(AdminError::Status(status.as_u16()));
        }

        let body: GraphQLResponse<T> = serde_json::from_slice(&response.bytes().await?)?;

        if let Some(errors) = body.errors
            && !errors.is_empty()
        {
            return Err(AdminError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        path: e.path,
                    })
                    .collect(),
            ));
        }

        body.data.ok_or_else(|| {
            AdminError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                path: vec![],
            }])
        })
    }
}

#[async_trait]
impl OrderLookup for AdminClient {
    #[instrument(skip_all, fields(shop = %session.shop, order = %order_number))]
    async fn find_order(
        &self,
        session: &ApiSession,
        order_number: &OrderNumber,
        email: &str,
    ) -> Result<Option<TrackedOrder>, AdminError> {
        let variables = serde_json::json!({
            "query": order_search_query(order_number, email),
        });

        let data: OrderTrackingData = self
            .execute(session, ORDER_TRACKING_QUERY, variables)
            .await?;

        Ok(data
            .orders
            .edges
            .into_iter()
            .next()
            .map(|edge| convert_order(edge.node)))
    }
}

/// Build the order search filter.
///
/// Values are quoted and stripped of quote/backslash characters so shopper
/// input cannot add search terms of its own. A value that matches nothing
/// yields an empty result, not an error.
fn order_search_query(order_number: &OrderNumber, email: &str) -> String {
    format!(
        "name:{} email:{}",
        quote_term(order_number.as_str()),
        quote_term(email)
    )
}

fn quote_term(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '"' | '\\'))
        .collect();
    format!("\"{cleaned}\"")
}

fn convert_order(node: OrderNode) -> TrackedOrder {
    TrackedOrder {
        id: node.id,
        name: node.name,
        email: node.email,
        fulfillments: node
            .fulfillments
            .edges
            .into_iter()
            .map(|edge| OrderFulfillment {
                tracking_company: edge.node.tracking_company,
                tracking_number: edge.node.tracking_number,
                tracking_url: edge.node.tracking_url,
            })
            .collect(),
    }
}
