//! # homestay-api: Axum API Service
//!
//! The HTTP surface of the Homestay stack. Assembles one router per record
//! collection into a single application with shared middleware for
//! authentication, tracing, and request metrics.
//!
//! ## Routes
//!
//! - `/v1/rooms/*`, `/v1/guests/*`, `/v1/bookings/*`, `/v1/payments/*`,
//!   `/v1/maintenance/*`, `/v1/compliance/*`, `/v1/staff/*`
//! - `/v1/dashboard`: cross-collection figures
//! - `/v1/analytics`: monthly revenue trend and rooms per type
//! - `/openapi.json`: generated OpenAPI document
//! - `/health/*`: liveness and readiness probes (unauthenticated)
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//!
//! Handlers validate input and delegate every derived value (nights, GST,
//! totals, occupancy, compliance status) to `homestay-calc`, and every
//! status change to `homestay-state`.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router.
///
/// Health probes are mounted outside the auth middleware so they stay
/// reachable without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    // Execution order, outermost first: trace, metrics, auth, handler.
    let api = Router::new()
        .merge(routes::rooms::router())
        .merge(routes::guests::router())
        .merge(routes::bookings::router())
        .merge(routes::payments::router())
        .merge(routes::maintenance::router())
        .merge(routes::compliance::router())
        .merge(routes::staff::router())
        .merge(routes::dashboard::router())
        .merge(routes::analytics::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(Extension(auth_config))
        .layer(Extension(metrics))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

async fn liveness() -> &'static str {
    "ok"
}

/// Ready once the stores are readable and, when configured, the database
/// answers.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.rooms.len();
    let _ = state.bookings.len();

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
