//! HTTP middleware stack for the proxy.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlate logs across a request)
//! 4. Cross-origin headers (every response, success and error alike)

pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::request_id_middleware;
