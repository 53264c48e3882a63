//! Error types for the relay pipeline.
//!
//! Low-level failures (HTTP transport, JSON decoding) are converted into one of
//! these kinds where they happen, so nothing raw reaches the web layer.

use axum::http::StatusCode;
use thiserror::Error;

/// Failure of a single call to the forum API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection could not be established or was interrupted.
    #[error("network error: {message}")]
    Network { message: String },

    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered 2xx but the body was not a thread object.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

/// Delivery gave up after using every allowed attempt.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("failed to create forum thread after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl DeliveryError {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Why a webhook request failed.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Required settings are missing from the environment.
    #[error("missing environment variables: {}", .missing.join(", "))]
    Config { missing: Vec<&'static str> },

    /// Signature header absent or not matching the payload.
    #[error("invalid webhook signature")]
    Auth,

    /// Payload is not a valid issue event.
    #[error("invalid JSON payload: {0}")]
    Parse(String),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl PipelineError {
    /// Stable machine-readable code returned to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config_error",
            Self::Auth => "invalid_signature",
            Self::Parse(_) => "invalid_payload",
            Self::Delivery(_) => "delivery_failed",
        }
    }

    /// HTTP status this error maps to at the boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PipelineError::Auth.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            PipelineError::Parse("eof".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PipelineError::Config { missing: vec!["X"] }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::Config {
            missing: vec!["GITHUB_WEBHOOK_SECRET", "DISCORD_BOT_TOKEN"],
        };
        assert_eq!(
            err.to_string(),
            "missing environment variables: GITHUB_WEBHOOK_SECRET, DISCORD_BOT_TOKEN"
        );

        let err = PipelineError::from(DeliveryError::Exhausted {
            attempts: 3,
            last_error: "HTTP 503: unavailable".into(),
        });
        assert_eq!(err.code(), "delivery_failed");
        assert_eq!(
            err.to_string(),
            "failed to create forum thread after 3 attempts: HTTP 503: unavailable"
        );
    }
}
