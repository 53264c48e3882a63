//! Web server module for the GitHub webhook endpoint.
//!
//! This module provides:
//! - `POST /api/github-webhook` running the relay pipeline
//! - 405 for every other method on that route
//! - `GET /health`
//! - A panic boundary so one bad request cannot take the process down

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use handlers::{
    github_webhook, handle_panic, health, method_not_allowed, AppState, HealthResponse,
    ThreadSummary, WebhookResponse,
};

/// Path GitHub is configured to deliver to.
pub const WEBHOOK_PATH: &str = "/api/github-webhook";

/// Largest body accepted; GitHub caps webhook payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            WEBHOOK_PATH,
            post(github_webhook).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
