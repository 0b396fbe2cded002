//! Per-request correlation ids.
//!
//! Proxied storefront traffic arrives without a trustworthy correlation
//! header - anything inbound is shopper-controlled - so every request gets a
//! freshly minted UUID instead. The id is recorded on the tracing span,
//! tagged on the Sentry scope, and echoed in `x-request-id` so a shopper
//! report can be matched to the server logs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Response header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tag the request with a fresh correlation id.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
