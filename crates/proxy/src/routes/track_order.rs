//! Order-tracking endpoint, served through the platform's app proxy.
//!
//! Storefront widgets POST an order number and email here; the platform
//! relays the call with a signed query string. The pipeline is linear with
//! no retries: verify the signature, resolve the shop's stored credentials,
//! look the order up on the Admin API, and map the outcome onto a fixed set
//! of JSON responses. Whatever fails, the shopper sees one of the messages
//! below and nothing else.

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::form_urlencoded;

use tracknest_core::{OrderNumber, ShopDomain};

use crate::state::AppState;
use crate::verify::{SIGNATURE_PARAM, verify_signed_query};

// =============================================================================
// Request / Response Types
// =============================================================================

/// Tracking lookup request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOrderRequest {
    /// Order number as the shopper typed it (display `#` prefix allowed).
    pub order_number: String,
    /// Email the order was placed with.
    pub email: String,
}

/// Carrier and tracking details of a dispatched order.
///
/// Fields are passed through from the platform as-is; absent values are
/// serialized as explicit nulls rather than dropped or defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    /// Carrier tracking number.
    pub tracking_number: Option<String>,
    /// Carrier tracking page URL.
    pub tracking_url: Option<String>,
    /// Carrier name.
    pub tracking_company: Option<String>,
}

/// The closed set of responses the endpoint can produce.
///
/// One variant per status/message combination; handlers never build response
/// bodies ad hoc, so nothing internal can leak into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOrderResponse {
    /// 400 - `shop` or `hmac` missing from the query.
    MissingParams,
    /// 400 - request body is not the expected JSON shape.
    InvalidBody,
    /// 403 - signature did not verify.
    InvalidSignature,
    /// 401 - no stored credentials for the shop.
    SessionNotFound,
    /// 404 - no order matched the number and email.
    OrderNotFound,
    /// 200 - order exists but has no fulfillment yet.
    NotDispatched,
    /// 200 - order dispatched; tracking details attached.
    Dispatched(TrackingInfo),
    /// 500 - a collaborator failed; details stay out of the body.
    Failure,
}

impl TrackOrderResponse {
    /// HTTP status of the variant.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParams | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::FORBIDDEN,
            Self::SessionNotFound => StatusCode::UNAUTHORIZED,
            Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::NotDispatched | Self::Dispatched(_) => StatusCode::OK,
            Self::Failure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shopper-facing message of the variant.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingParams => "Missing shop or hmac in query.",
            Self::InvalidBody => "Invalid request body. Expected orderNumber and email.",
            Self::InvalidSignature => "Invalid HMAC.",
            Self::SessionNotFound => {
                "Could not find a valid session for this shop. Please reinstall the app."
            }
            Self::OrderNotFound => "Order not found. Please check your order number and email.",
            Self::NotDispatched => "Your order has not been dispatched yet.",
            Self::Dispatched(_) => "Your order has been dispatched!",
            Self::Failure => "An error occurred while tracking your order. Please try again.",
        }
    }
}

/// Serialized body shape shared by every variant.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody<'a> {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_info: Option<&'a TrackingInfo>,
}

impl IntoResponse for TrackOrderResponse {
    fn into_response(self) -> Response {
        let tracking_info = match &self {
            Self::Dispatched(info) => Some(info),
            _ => None,
        };
        let body = ResponseBody {
            message: self.message(),
            tracking_info,
        };
        (self.status(), Json(&body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /apps/track-order - look up fulfillment status for an order.
///
/// The body is taken raw on purpose: it must not be touched before the
/// signature check, and a malformed body has its own 400 mapping instead of
/// an extractor rejection.
#[instrument(skip_all, fields(shop = tracing::field::Empty))]
pub async fn track_order(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> TrackOrderResponse {
    let params = parse_query_pairs(query.as_deref().unwrap_or(""));

    let (Some(shop), Some(_)) = (
        first_value(&params, "shop"),
        first_value(&params, SIGNATURE_PARAM),
    ) else {
        return TrackOrderResponse::MissingParams;
    };
    tracing::Span::current().record("shop", shop);

    if !verify_signed_query(&params, state.config().shopify.api_secret.expose_secret()) {
        tracing::warn!("rejected app proxy call with invalid signature");
        return TrackOrderResponse::InvalidSignature;
    }

    let Ok(request) = serde_json::from_slice::<TrackOrderRequest>(&body) else {
        return TrackOrderResponse::InvalidBody;
    };

    // A shop identifier that is not a domain cannot have a stored session
    let Ok(shop) = ShopDomain::parse(shop) else {
        return TrackOrderResponse::SessionNotFound;
    };

    let session = match state.sessions().find_by_shop(&shop).await {
        Ok(Some(session)) => session,
        Ok(None) => return TrackOrderResponse::SessionNotFound,
        Err(error) => {
            tracing::error!(error = %error, "session lookup failed");
            return TrackOrderResponse::Failure;
        }
    };

    let order_number = OrderNumber::new(&request.order_number);

    match state
        .orders()
        .find_order(&session, &order_number, &request.email)
        .await
    {
        Ok(None) => TrackOrderResponse::OrderNotFound,
        Ok(Some(order)) => match order.fulfillments.into_iter().next() {
            None => TrackOrderResponse::NotDispatched,
            Some(fulfillment) => TrackOrderResponse::Dispatched(TrackingInfo {
                tracking_number: fulfillment.tracking_number,
                tracking_url: fulfillment.tracking_url,
                tracking_company: fulfillment.tracking_company,
            }),
        },
        Err(error) => {
            tracing::error!(order = %order_number, error = %error, "order lookup failed");
            TrackOrderResponse::Failure
        }
    }
}

/// OPTIONS /apps/track-order - cross-origin pre-flight.
///
/// Always 204 with no body; the cross-origin middleware attaches the actual
/// headers on the way out.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

// =============================================================================
// Helpers
// =============================================================================

/// Decode the raw query string into pairs, preserving order and repeats.
fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

fn first_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use hmac::{Hmac, Mac};
    use secrecy::SecretString;
    use sha2::Sha256;
    use tower::ServiceExt;

    use crate::config::{ProxyConfig, ShopifyProxyConfig};
    use crate::sessions::{ApiSession, SessionStore, SessionStoreError};
    use crate::shopify::{AdminError, OrderFulfillment, OrderLookup, TrackedOrder};
    use crate::state::AppState;

    const SECRET: &str = "test-proxy-secret";
    const SHOP: &str = "demo.myshopify.com";
    const BODY: &str = r##"{"orderNumber": "#1001", "email": "jane@example.com"}"##;

    // =========================================================================
    // Fakes
    // =========================================================================

    #[derive(Default)]
    struct FakeSessionStore {
        session: Option<ApiSession>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SessionStore for FakeSessionStore {
        async fn find_by_shop(
            &self,
            _shop: &ShopDomain,
        ) -> Result<Option<ApiSession>, SessionStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SessionStoreError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.session.clone())
        }
    }

    #[derive(Default)]
    struct FakeOrderLookup {
        order: Option<TrackedOrder>,
        fail: bool,
        calls: AtomicUsize,
        seen_numbers: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl OrderLookup for FakeOrderLookup {
        async fn find_order(
            &self,
            _session: &ApiSession,
            order_number: &OrderNumber,
            _email: &str,
        ) -> Result<Option<TrackedOrder>, AdminError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_numbers
                .lock()
                .unwrap()
                .push(order_number.as_str().to_string());
            if self.fail {
                return Err(AdminError::Status(502));
            }
            Ok(self.order.clone())
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn stored_session() -> ApiSession {
        ApiSession {
            shop: SHOP.to_string(),
            access_token: SecretString::from("shpat_test_token"),
            scope: Some("read_orders".to_string()),
        }
    }

    fn order(fulfillments: Vec<OrderFulfillment>) -> TrackedOrder {
        TrackedOrder {
            id: "gid://shopify/Order/1".to_string(),
            name: "#1001".to_string(),
            email: Some("jane@example.com".to_string()),
            fulfillments,
        }
    }

    fn fulfillment() -> OrderFulfillment {
        OrderFulfillment {
            tracking_company: Some("UPS".to_string()),
            tracking_number: Some("1Z999".to_string()),
            tracking_url: Some("https://x/1Z999".to_string()),
        }
    }

    fn test_config() -> ProxyConfig {
        ProxyConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://tracknest.example.com".to_string(),
            shopify: ShopifyProxyConfig {
                api_secret: SecretString::from(SECRET),
                api_version: "2026-01".to_string(),
            },
            sentry_dsn: None,
        }
    }

    fn test_app(sessions: &Arc<FakeSessionStore>, orders: &Arc<FakeOrderLookup>) -> Router {
        let state = AppState::new(
            test_config(),
            Arc::clone(sessions) as Arc<dyn SessionStore>,
            Arc::clone(orders) as Arc<dyn OrderLookup>,
        );
        crate::routes::routes()
            .layer(axum::middleware::from_fn(
                crate::middleware::cors_middleware,
            ))
            .with_state(state)
    }

    /// Sign a query the way the platform does.
    fn sign_query(pairs: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = pairs.to_vec();
        sorted.sort_by_key(|(k, _)| *k);
        let message = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn signed_uri() -> String {
        let signature = sign_query(&[("shop", SHOP), ("timestamp", "1700000000")]);
        format!("/apps/track-order?shop={SHOP}&timestamp=1700000000&hmac={signature}")
    }

    async fn post(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // =========================================================================
    // Variant mapping
    // =========================================================================

    #[test]
    fn test_variant_statuses() {
        assert_eq!(
            TrackOrderResponse::MissingParams.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TrackOrderResponse::InvalidBody.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TrackOrderResponse::InvalidSignature.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            TrackOrderResponse::SessionNotFound.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            TrackOrderResponse::OrderNotFound.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(TrackOrderResponse::NotDispatched.status(), StatusCode::OK);
        assert_eq!(
            TrackOrderResponse::Failure.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_variant_messages_are_user_safe() {
        assert_eq!(
            TrackOrderResponse::InvalidSignature.message(),
            "Invalid HMAC."
        );
        assert_eq!(
            TrackOrderResponse::Failure.message(),
            "An error occurred while tracking your order. Please try again."
        );
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    #[tokio::test]
    async fn test_missing_shop_and_hmac_returns_400() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        let response = post(test_app(&sessions, &orders), "/apps/track-order", BODY).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Missing shop or hmac in query.");
        // Nothing downstream may run without the required parameters
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_hmac_alone_returns_400() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        let uri = format!("/apps/track-order?shop={SHOP}");
        let response = post(test_app(&sessions, &orders), &uri, BODY).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_signature_returns_403_without_session_lookup() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup::default());

        let uri = format!("/apps/track-order?shop={SHOP}&hmac={}", "ab".repeat(32));
        let response = post(test_app(&sessions, &orders), &uri, BODY).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid HMAC.");
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orders.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reordered_query_parameters_still_verify() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        // Same parameters as signed_uri(), deliberately out of sorted order
        let signature = sign_query(&[("shop", SHOP), ("timestamp", "1700000000")]);
        let uri =
            format!("/apps/track-order?timestamp=1700000000&hmac={signature}&shop={SHOP}");
        let response = post(test_app(&sessions, &orders), &uri, BODY).await;

        // Past the signature check: the empty store answers 401, not 403
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_returns_400_after_signature_check() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup::default());

        let response = post(test_app(&sessions, &orders), &signed_uri(), "not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "Invalid request body. Expected orderNumber and email."
        );
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_with_bad_signature_returns_403() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        let uri = format!("/apps/track-order?shop={SHOP}&hmac=00");
        let response = post(test_app(&sessions, &orders), &uri, "not json").await;

        // Signature is checked before the body is even parsed
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_body_fields_return_400() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        let response = post(test_app(&sessions, &orders), &signed_uri(), "{}").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_no_session_returns_401_without_order_lookup() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup {
            order: Some(order(vec![fulfillment()])),
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "Could not find a valid session for this shop. Please reinstall the app."
        );
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orders.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_store_failure_returns_generic_500() {
        let sessions = Arc::new(FakeSessionStore {
            fail: true,
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup::default());

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "An error occurred while tracking your order. Please try again."
        );
        assert_eq!(orders.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_matching_order_returns_404() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup::default());

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "Order not found. Please check your order number and email."
        );
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_order_without_fulfillment_returns_200_without_tracking_info() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup {
            order: Some(order(vec![])),
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Your order has not been dispatched yet.");
        assert!(json.get("trackingInfo").is_none());
    }

    #[tokio::test]
    async fn test_dispatched_order_returns_200_with_tracking_info() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup {
            order: Some(order(vec![fulfillment()])),
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Your order has been dispatched!");
        assert_eq!(
            json["trackingInfo"],
            serde_json::json!({
                "trackingNumber": "1Z999",
                "trackingUrl": "https://x/1Z999",
                "trackingCompany": "UPS",
            })
        );
    }

    #[tokio::test]
    async fn test_first_fulfillment_wins() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let second = OrderFulfillment {
            tracking_company: Some("DHL".to_string()),
            tracking_number: Some("JD014600".to_string()),
            tracking_url: None,
        };
        let orders = Arc::new(FakeOrderLookup {
            order: Some(order(vec![fulfillment(), second])),
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        let json = body_json(response).await;
        assert_eq!(json["trackingInfo"]["trackingCompany"], "UPS");
    }

    #[tokio::test]
    async fn test_absent_tracking_fields_pass_through_as_nulls() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup {
            order: Some(order(vec![OrderFulfillment {
                tracking_company: None,
                tracking_number: Some("1Z000".to_string()),
                tracking_url: None,
            }])),
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        let json = body_json(response).await;
        let info = json["trackingInfo"].as_object().unwrap();
        assert_eq!(info["trackingNumber"], "1Z000");
        // Keys present, values null - not dropped, not defaulted
        assert!(info.contains_key("trackingUrl"));
        assert!(info["trackingUrl"].is_null());
        assert!(info["trackingCompany"].is_null());
    }

    #[tokio::test]
    async fn test_order_number_is_normalized_before_lookup() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup::default());

        let body = r#"{"orderNumber": " #1001 ", "email": "jane@example.com"}"#;
        post(test_app(&sessions, &orders), &signed_uri(), body).await;

        assert_eq!(
            *orders.seen_numbers.lock().unwrap(),
            vec!["1001".to_string()]
        );
    }

    #[tokio::test]
    async fn test_order_lookup_failure_returns_generic_500() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup {
            fail: true,
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "An error occurred while tracking your order. Please try again."
        );
        // The upstream status must not leak
        assert!(!json["message"].as_str().unwrap().contains("502"));
    }

    // =========================================================================
    // Cross-origin behavior
    // =========================================================================

    #[tokio::test]
    async fn test_preflight_returns_204_with_cors_headers_and_no_body() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        let response = test_app(&sessions, &orders)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    // No query parameters at all - pre-flights are unsigned
                    .uri("/apps/track-order")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_preflight_ignores_query_parameters() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        // Query parameters are irrelevant to a pre-flight, valid or not
        let uri = format!("/apps/track-order?shop={SHOP}&hmac=garbage");
        let response = test_app(&sessions, &orders)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_responses_carry_cors_headers() {
        let sessions = Arc::new(FakeSessionStore::default());
        let orders = Arc::new(FakeOrderLookup::default());

        let uri = format!("/apps/track-order?shop={SHOP}&hmac=00");
        let response = post(test_app(&sessions, &orders), &uri, BODY).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            "POST, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_success_responses_carry_cors_headers() {
        let sessions = Arc::new(FakeSessionStore {
            session: Some(stored_session()),
            ..Default::default()
        });
        let orders = Arc::new(FakeOrderLookup {
            order: Some(order(vec![fulfillment()])),
            ..Default::default()
        });

        let response = post(test_app(&sessions, &orders), &signed_uri(), BODY).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
