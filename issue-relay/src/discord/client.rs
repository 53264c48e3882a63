//! Discord REST client for creating forum threads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;

/// Threads auto-archive after 24 hours of inactivity.
pub const AUTO_ARCHIVE_MINUTES: u32 = 1440;

/// Body of `POST /channels/{channel.id}/threads` for a forum channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateThread {
    pub name: String,
    pub message: ThreadStarter,
    pub auto_archive_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadStarter {
    pub content: String,
}

impl CreateThread {
    pub fn new(name: String, content: String) -> Self {
        Self {
            name,
            message: ThreadStarter { content },
            auto_archive_duration: AUTO_ARCHIVE_MINUTES,
        }
    }
}

/// The channel object Discord returns for a new thread.
///
/// Only `id` and `type` are guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// The one forum operation the relay needs.
///
/// Implemented over HTTP by [`DiscordClient`]; tests substitute fakes.
#[async_trait]
pub trait ForumApi: Send + Sync {
    async fn create_thread(
        &self,
        bot_token: &str,
        channel_id: &str,
        request: &CreateThread,
    ) -> Result<ThreadChannel, ApiError>;
}

/// HTTP implementation of [`ForumApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl DiscordClient {
    /// Create a client against `api_base`, e.g. `https://discord.com/api/v10`.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("issue-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            timeout,
        })
    }

    fn threads_url(&self, channel_id: &str) -> Result<Url, ApiError> {
        let base = format!("{}/", self.api_base.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|base| base.join(&format!("channels/{}/threads", channel_id)))
            .map_err(|e| ApiError::Network {
                message: format!("invalid Discord API URL: {}", e),
            })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ApiError::Network {
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ForumApi for DiscordClient {
    async fn create_thread(
        &self,
        bot_token: &str,
        channel_id: &str,
        request: &CreateThread,
    ) -> Result<ThreadChannel, ApiError> {
        let url = self.threads_url(channel_id)?;

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bot {}", bot_token))
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                channel_id = channel_id,
                status_code = status.as_u16(),
                body_preview = %body.chars().take(200).collect::<String>(),
                "discord_create_thread_rejected"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let thread: ThreadChannel = response.json().await.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })?;

        info!(
            channel_id = channel_id,
            thread_id = %thread.id,
            "discord_thread_created"
        );

        Ok(thread)
    }
}
