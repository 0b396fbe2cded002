//! Cross-origin headers for the app proxy endpoint.
//!
//! The endpoint is called from shopper-facing storefronts on arbitrary
//! domains, so every response carries permissive cross-origin headers -
//! errors included, or the browser hides the JSON body from the widget.
//! Pre-flight OPTIONS requests are answered by an explicit route with 204;
//! this middleware only stamps the headers on the way out.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
    },
    middleware::Next,
    response::Response,
};

/// Add permissive cross-origin headers to all responses.
pub async fn cors_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Accept"),
    );

    // Let browsers cache the pre-flight result for a day
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));

    response
}
