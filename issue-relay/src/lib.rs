//! Issue Relay - GitHub issue webhooks into Discord forum threads.
//!
//! This library provides the modules behind the `issue-relay` binary:
//! - `github`: inbound payload, signature verification, classification
//! - `message`: forum post formatting within Discord's limits
//! - `discord`: forum API client and retrying delivery
//! - `pipeline`: the per-request orchestration
//! - `web`: axum router and response mapping
//! - `shutdown`: SIGINT/SIGTERM handling for the server
//!
//! ## Architecture
//!
//! ```text
//! GitHub → POST /api/github-webhook → Pipeline → Discord forum thread
//! ```

pub mod config;
pub mod discord;
pub mod error;
pub mod github;
pub mod message;
pub mod pipeline;
pub mod shutdown;
pub mod web;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use discord::{Deliverer, DiscordClient, ForumApi, RetryPolicy, ThreadRecord};
pub use error::{ApiError, DeliveryError, PipelineError};
pub use github::{classify, verify_github_signature, EventEnvelope, IssueEvent};
pub use message::{format_issue, ThreadMessage};
pub use pipeline::{Pipeline, PipelineResult};
pub use web::AppState;
