//! Forum thread delivery with bounded retries and exponential backoff.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::discord::client::{CreateThread, ForumApi, ThreadChannel};
use crate::error::{ApiError, DeliveryError};
use crate::github::{Issue, Repository};
use crate::message::format_issue;

/// How often and how patiently to retry thread creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failure; doubles after each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (1-based), or `None` after the last.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let exponent = attempt.saturating_sub(1).min(16);
        Some(self.base_delay * 2u32.pow(exponent))
    }
}

/// Discord's acknowledgement of a created thread, handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub parent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

impl ThreadRecord {
    /// Fill the fields Discord may omit with what was sent.
    fn from_channel(thread: ThreadChannel, requested_name: &str, channel_id: &str) -> Self {
        Self {
            id: thread.id,
            name: thread.name.unwrap_or_else(|| requested_name.to_string()),
            kind: thread.kind,
            parent_id: thread.parent_id.unwrap_or_else(|| channel_id.to_string()),
            guild_id: thread.guild_id,
        }
    }
}

/// Bookkeeping for one `deliver` call.
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    last_error: Option<ApiError>,
}

/// Posts an issue to a forum channel, retrying transient failures.
///
/// Built per request; it borrows the API and credentials and keeps no state
/// between calls.
pub struct Deliverer<'a> {
    api: &'a dyn ForumApi,
    bot_token: &'a str,
    channel_id: &'a str,
    policy: RetryPolicy,
}

impl<'a> Deliverer<'a> {
    pub fn new(api: &'a dyn ForumApi, bot_token: &'a str, channel_id: &'a str) -> Self {
        Self {
            api,
            bot_token,
            channel_id,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create a forum thread for `issue`.
    ///
    /// Every failed attempt except the last is followed by a backoff sleep
    /// that suspends only the calling task.
    pub async fn deliver(
        &self,
        issue: &Issue,
        repository: &Repository,
    ) -> Result<ThreadRecord, DeliveryError> {
        let message = format_issue(issue, repository);
        let request = CreateThread::new(message.title.clone(), message.content);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = RetryState::default();

        while state.attempt < max_attempts {
            info!(
                issue_number = issue.number,
                attempt = state.attempt + 1,
                max_attempts = max_attempts,
                "discord_thread_attempt"
            );

            match self
                .api
                .create_thread(self.bot_token, self.channel_id, &request)
                .await
            {
                Ok(thread) => {
                    let record = ThreadRecord::from_channel(thread, &message.title, self.channel_id);
                    info!(
                        issue_number = issue.number,
                        thread_id = %record.id,
                        thread_name = %record.name,
                        attempts = state.attempt + 1,
                        "discord_thread_delivered"
                    );
                    return Ok(record);
                }
                Err(e) => {
                    state.attempt += 1;
                    warn!(
                        issue_number = issue.number,
                        attempt = state.attempt,
                        max_attempts = max_attempts,
                        error = %e,
                        "discord_thread_attempt_failed"
                    );
                    state.last_error = Some(e);

                    let Some(delay) = self.policy.delay_after(state.attempt) else {
                        break;
                    };
                    info!(delay_ms = delay.as_millis() as u64, "discord_thread_retry_scheduled");
                    sleep(delay).await;
                }
            }
        }

        let last_error = state
            .last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());

        error!(
            issue_number = issue.number,
            attempts = state.attempt,
            last_error = %last_error,
            "discord_thread_delivery_exhausted"
        );

        Err(DeliveryError::Exhausted {
            attempts: state.attempt,
            last_error,
        })
    }
}
