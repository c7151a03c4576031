//! # hallbridge-api: Axum API Service for HallBridge
//!
//! HTTP surface over the room inventory: provisioning, bed allocation,
//! guarded status changes and occupancy statistics, plus the student
//! directory and hall settings the occupancy core reads.
//!
//! ## API Surface
//!
//! | Prefix            | Module                 | Domain                       |
//! |-------------------|------------------------|------------------------------|
//! | `/v1/rooms/*`     | [`routes::rooms`]      | Rooms, beds, statistics      |
//! | `/v1/students/*`  | [`routes::students`]   | Student directory            |
//! | `/v1/settings/*`  | [`routes::settings`]   | Cutoffs and fees             |
//! | `/openapi.json`   | [`openapi`]            | Generated OpenAPI document   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! `/health/*` and `/metrics` sit outside the stack and need no credentials.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod settings;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};
use hallbridge_state::RoomFilter;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests: state.config.rate_limit_per_minute,
        ..RateLimitConfig::default()
    });
    let metrics = state.config.metrics_enabled.then(ApiMetrics::new);

    let mut api = Router::new()
        .merge(routes::rooms::router())
        .merge(routes::students::router())
        .merge(routes::settings::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(auth::auth_middleware));
    if metrics.is_some() {
        api = api.layer(from_fn(middleware::metrics::metrics_middleware));
    }
    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .layer(Extension(limiter))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    match metrics {
        Some(metrics) => Router::new()
            .merge(
                health
                    .route("/metrics", get(prometheus_metrics))
                    .with_state(state),
            )
            .merge(api)
            .layer(Extension(metrics)),
        None => Router::new().merge(health.with_state(state)).merge(api),
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 503 while the database is unreachable.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!(error = %e, "readiness check failed: database unreachable");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unavailable");
        }
    }
    (StatusCode::OK, "ready")
}

/// Prometheus scrape endpoint. Room gauges are refreshed on every scrape.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let stats = state.rooms.read().report(&RoomFilter::default()).overall;
    metrics.set_room_gauges(&stats);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.render(),
    )
}
