//! Tracknest proxy binary.
//!
//! Serves the app-proxy surface of the app: one storefront-facing endpoint,
//! relayed and signed by the platform, that looks up fulfillment status for
//! an order. The embedded admin UI, OAuth, and billing live elsewhere; this
//! process only reads what the OAuth layer stores.
//!
//! # Security
//!
//! Every proxied request must carry a valid platform signature. The app
//! secret, the database URL, and stored access tokens are held as
//! `secrecy::SecretString` and stay out of logs and response bodies.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracknest_proxy::config::ProxyConfig;
use tracknest_proxy::middleware;
use tracknest_proxy::routes;
use tracknest_proxy::sessions::{self, PgSessionStore};
use tracknest_proxy::shopify::AdminClient;
use tracknest_proxy::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ProxyConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // RUST_LOG wins when set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tracknest_proxy=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Assemble the full router: tracking endpoint, health probes, and the
/// middleware stack (Sentry outermost for full request coverage).
fn app_router(state: AppState, pool: PgPool) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .with_state(pool);

    Router::new()
        .merge(health_routes)
        .merge(
            routes::routes()
                .layer(axum::middleware::from_fn(middleware::cors_middleware))
                .with_state(state),
        )
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[tokio::main]
async fn main() {
    let config = ProxyConfig::from_env().expect("Failed to load configuration");

    // Sentry first: the tracing layer below needs a live hub
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    // The shopify_sessions table is owned and migrated by the OAuth layer;
    // this pool only ever reads it
    let pool = sessions::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let session_store = Arc::new(PgSessionStore::new(pool.clone()));
    let admin_client = Arc::new(AdminClient::new(&config.shopify));
    let state = AppState::new(config.clone(), session_store, admin_client);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(base_url = %config.base_url, "proxy listening on {addr}");

    axum::serve(listener, app_router(state, pool))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness probe. Answers as long as the process is up.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe. 503 until the session-store database is reachable.
async fn readiness(State(pool): State<PgPool>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(&pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
