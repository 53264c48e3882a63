//! Webhook endpoint handlers.
//!
//! The handler hands the raw body and signature header to the [`Pipeline`]
//! and maps its result to an HTTP response. It never parses the body itself,
//! since any re-encoding would break the signature.

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::discord::ForumApi;
use crate::github::SIGNATURE_HEADER;
use crate::pipeline::{Pipeline, PipelineResult};
use crate::Config;

const EVENT_HEADER: &str = "x-github-event";
const DELIVERY_HEADER: &str = "x-github-delivery";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(config: Arc<Config>, api: Arc<dyn ForumApi>) -> Self {
        Self {
            pipeline: Pipeline::new(config, api),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// GitHub Webhook
// =============================================================================

/// Thread summary returned after a successful delivery.
#[derive(Debug, Serialize)]
pub struct ThreadSummary {
    pub id: String,
    pub name: String,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl WebhookResponse {
    fn failure(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            thread: None,
            error: Some(error),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for PipelineResult {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            PipelineResult::Delivered { thread } => (
                StatusCode::OK,
                WebhookResponse {
                    success: true,
                    message: Some("Discord forum thread created successfully".to_string()),
                    thread: Some(ThreadSummary {
                        id: thread.id,
                        name: thread.name,
                    }),
                    error: None,
                    details: None,
                },
            ),
            PipelineResult::Ignored { action } => (
                StatusCode::OK,
                WebhookResponse {
                    success: true,
                    message: Some(format!("Event ignored: {}", action)),
                    thread: None,
                    error: None,
                    details: None,
                },
            ),
            PipelineResult::Failed(e) => {
                (e.status(), WebhookResponse::failure(e.code(), e.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}

/// GitHub issues webhook endpoint.
///
/// This endpoint:
/// 1. Takes the body as raw bytes
/// 2. Runs the pipeline (config, signature, parse, classify, deliver)
/// 3. Maps the outcome to 200, 401 or 500
pub async fn github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = header_value(&headers, SIGNATURE_HEADER);

    info!(
        github_event = header_value(&headers, EVENT_HEADER).unwrap_or("unknown"),
        delivery_id = header_value(&headers, DELIVERY_HEADER).unwrap_or("unknown"),
        has_signature = signature.is_some(),
        body_length = body.len(),
        "github_webhook_received"
    );

    let result = state.pipeline.process(&body, signature).await;

    info!(success = result.is_success(), "github_webhook_processed");

    result.into_response()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Any non-POST request to the webhook route.
pub async fn method_not_allowed() -> impl IntoResponse {
    #[derive(Serialize)]
    struct MethodNotAllowed {
        error: &'static str,
    }

    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MethodNotAllowed {
            error: "Method not allowed. This endpoint only accepts POST requests.",
        }),
    )
}

/// Turn a panic inside a handler into a 500 instead of a dropped connection.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error".to_string()
    };

    error!(panic = %detail, "webhook_handler_panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(WebhookResponse::failure("internal_error", "Internal server error")),
    )
        .into_response()
}
