//! Route configuration and setup.

mod health;

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use mediasan_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub const UPLOAD_PATH: &str = "/api/upload";
pub const HEALTH_PATH: &str = "/health";

/// Setup all application routes
///
/// The body limit sits above the per-file ceiling so an oversized file still
/// reaches the validator and gets a size rejection instead of a bare 413.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let http_concurrency_limit = config.base.http_concurrency_limit.max(1);
    tracing::info!(
        http_concurrency_limit,
        max_request_body_bytes = config.max_request_body_bytes(),
        "HTTP limits enabled"
    );

    Router::new()
        .route(UPLOAD_PATH, post(handlers::upload::upload_file))
        .route(HEALTH_PATH, get(health::liveness_check))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(config.max_request_body_bytes()))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
