//! HTTP route handlers for the proxy.
//!
//! # Route Structure
//!
//! ```text
//! POST    /apps/track-order - Order tracking lookup (platform app proxy)
//! OPTIONS /apps/track-order - Cross-origin pre-flight
//! ```

pub mod track_order;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Create all routes for the proxy.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/apps/track-order",
        post(track_order::track_order).options(track_order::preflight),
    )
}
