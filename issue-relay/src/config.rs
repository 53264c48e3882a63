//! Configuration module for environment variable parsing.
//!
//! The environment is read once at startup. The resulting [`Config`] is shared
//! read-only between requests; handlers never touch `std::env` themselves.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::PipelineError;

/// Environment variable holding the GitHub webhook secret.
pub const WEBHOOK_SECRET_VAR: &str = "GITHUB_WEBHOOK_SECRET";

/// Environment variable holding the Discord bot token.
pub const BOT_TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";

/// Environment variable holding the target forum channel id.
pub const FORUM_CHANNEL_VAR: &str = "DISCORD_FORUM_CHANNEL_ID";

/// Default Discord REST API base (v10).
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret shared with GitHub for HMAC-SHA256 payload signatures
    pub github_webhook_secret: Option<String>,

    /// Discord bot token used to authenticate thread creation
    pub discord_bot_token: Option<String>,

    /// Forum channel that receives one thread per opened issue
    pub discord_forum_channel_id: Option<String>,

    /// Base URL of the Discord REST API
    pub discord_api_base: String,

    /// Timeout for a single Discord API request in milliseconds
    pub request_timeout_ms: u64,

    /// Port for the web server to listen on
    pub port: u16,
}

/// The three settings every request needs, checked for presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub webhook_secret: &'a str,
    pub bot_token: &'a str,
    pub forum_channel_id: &'a str,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            github_webhook_secret: non_empty_var(WEBHOOK_SECRET_VAR),

            discord_bot_token: non_empty_var(BOT_TOKEN_VAR),

            discord_forum_channel_id: non_empty_var(FORUM_CHANNEL_VAR),

            discord_api_base: non_empty_var("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE.to_string()),

            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", 10_000),

            port: parse_var("PORT", 8080),
        }
    }

    /// Per-request timeout for the Discord API.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Check that the secret, token and channel id are all present.
    ///
    /// Every missing variable is reported, not only the first one.
    pub fn credentials(&self) -> Result<Credentials<'_>, PipelineError> {
        let secret = present(&self.github_webhook_secret);
        let token = present(&self.discord_bot_token);
        let channel = present(&self.discord_forum_channel_id);

        match (secret, token, channel) {
            (Some(webhook_secret), Some(bot_token), Some(forum_channel_id)) => Ok(Credentials {
                webhook_secret,
                bot_token,
                forum_channel_id,
            }),
            _ => {
                let missing = [
                    (WEBHOOK_SECRET_VAR, secret.is_none()),
                    (BOT_TOKEN_VAR, token.is_none()),
                    (FORUM_CHANNEL_VAR, channel.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(PipelineError::Config { missing })
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid numeric value, using default");
            default
        }
    }
}
