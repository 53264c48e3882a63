//! Webhook pipeline: configuration check, signature check, parse, classify,
//! then format and deliver.
//!
//! ## Processing Flow
//!
//! ```text
//! raw body + signature → credentials → verify → EventEnvelope → classify
//!                                                                ├─ ignored
//!                                                                └─ IssueEvent → Deliverer → ThreadRecord
//! ```
//!
//! Each step short-circuits; nothing after a failure or an ignore runs.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::discord::{Deliverer, ForumApi, RetryPolicy, ThreadRecord};
use crate::error::PipelineError;
use crate::github::{classify, verify_github_signature, EventEnvelope, IssueEvent};

/// Outcome of one webhook request. Exactly one variant per invocation.
#[derive(Debug, Clone)]
pub enum PipelineResult {
    /// The event was valid but is not one the relay acts on.
    Ignored { action: String },
    /// A forum thread was created.
    Delivered { thread: ThreadRecord },
    /// Processing stopped at the given error.
    Failed(PipelineError),
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

impl From<Result<PipelineResult, PipelineError>> for PipelineResult {
    fn from(result: Result<PipelineResult, PipelineError>) -> Self {
        result.unwrap_or_else(PipelineResult::Failed)
    }
}

/// Stateless orchestrator shared by all requests.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<Config>,
    api: Arc<dyn ForumApi>,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(config: Arc<Config>, api: Arc<dyn ForumApi>) -> Self {
        Self {
            config,
            api,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Process one webhook delivery.
    ///
    /// `payload` must be the raw request body exactly as received.
    pub async fn process(&self, payload: &[u8], signature: Option<&str>) -> PipelineResult {
        let result: PipelineResult = self.run(payload, signature).await.into();

        if let PipelineResult::Failed(e) = &result {
            match e {
                PipelineError::Auth => warn!(code = e.code(), "webhook_rejected"),
                _ => error!(code = e.code(), error = %e, "webhook_failed"),
            }
        }

        result
    }

    async fn run(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<PipelineResult, PipelineError> {
        let credentials = self.config.credentials()?;

        if !verify_github_signature(payload, signature, credentials.webhook_secret) {
            return Err(PipelineError::Auth);
        }

        let envelope =
            EventEnvelope::from_slice(payload).map_err(|e| PipelineError::Parse(e.to_string()))?;

        if !classify(&envelope).actionable {
            info!(
                action = %envelope.action,
                repository = %envelope.repository_name(),
                "webhook_event_ignored"
            );
            return Ok(PipelineResult::Ignored {
                action: envelope.action,
            });
        }

        // Only an opened issue has to carry the full shape.
        let event =
            IssueEvent::from_slice(payload).map_err(|e| PipelineError::Parse(e.to_string()))?;
        let issue = event
            .opened_issue()
            .ok_or_else(|| PipelineError::Parse("opened event without issue".to_string()))?;

        info!(
            repository = %event.repository.full_name,
            issue_number = issue.number,
            "webhook_issue_opened"
        );

        let thread = Deliverer::new(
            self.api.as_ref(),
            credentials.bot_token,
            credentials.forum_channel_id,
        )
        .with_policy(self.retry)
        .deliver(issue, &event.repository)
        .await?;

        Ok(PipelineResult::Delivered { thread })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DISCORD_API_BASE;
    use crate::discord::{CreateThread, ThreadChannel};
    use crate::error::ApiError;
    use crate::github::sign_payload;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    const SECRET: &str = "webhook-secret";

    #[derive(Default)]
    struct RecordingApi {
        fail: bool,
        requests: Mutex<Vec<(String, String, CreateThread)>>,
    }

    #[async_trait]
    impl ForumApi for RecordingApi {
        async fn create_thread(
            &self,
            bot_token: &str,
            channel_id: &str,
            request: &CreateThread,
        ) -> Result<ThreadChannel, ApiError> {
            self.requests.lock().unwrap().push((
                bot_token.to_string(),
                channel_id.to_string(),
                request.clone(),
            ));
            if self.fail {
                return Err(ApiError::Network {
                    message: "connection reset".to_string(),
                });
            }
            Ok(ThreadChannel {
                id: "t-1".to_string(),
                name: Some(request.name.clone()),
                kind: 11,
                parent_id: Some(channel_id.to_string()),
                guild_id: None,
            })
        }
    }

    fn config() -> Config {
        Config {
            github_webhook_secret: Some(SECRET.to_string()),
            discord_bot_token: Some("bot-token".to_string()),
            discord_forum_channel_id: Some("forum-9".to_string()),
            discord_api_base: DEFAULT_DISCORD_API_BASE.to_string(),
            request_timeout_ms: 1000,
            port: 0,
        }
    }

    fn pipeline(config: Config, api: Arc<RecordingApi>) -> Pipeline {
        Pipeline::new(Arc::new(config), api).with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        })
    }

    fn payload(action: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": action,
            "issue": {
                "number": 3,
                "title": "Login button unresponsive",
                "body": "Click does nothing",
                "html_url": "https://github.com/octo-org/relay/issues/3",
                "user": { "login": "octocat" },
                "labels": []
            },
            "repository": { "name": "relay", "full_name": "octo-org/relay" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_opened_issue_delivered() {
        let api = Arc::new(RecordingApi::default());
        let body = payload("opened");
        let signature = sign_payload(&body, SECRET);

        let result = pipeline(config(), api.clone())
            .process(&body, Some(&signature))
            .await;

        match result {
            PipelineResult::Delivered { thread } => {
                assert_eq!(thread.id, "t-1");
                assert_eq!(thread.name, "[#3] Login button unresponsive");
                assert_eq!(thread.parent_id, "forum-9");
            }
            other => panic!("Expected Delivered, got {:?}", other),
        }

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "bot-token");
        assert_eq!(requests[0].1, "forum-9");
    }

    #[tokio::test]
    async fn test_non_opened_action_ignored() {
        let api = Arc::new(RecordingApi::default());
        let body = payload("closed");
        let signature = sign_payload(&body, SECRET);

        let result = pipeline(config(), api.clone())
            .process(&body, Some(&signature))
            .await;

        assert!(matches!(result, PipelineResult::Ignored { ref action } if action == "closed"));
        assert!(result.is_success());
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_checked_first() {
        let api = Arc::new(RecordingApi::default());
        let mut config = config();
        config.discord_bot_token = None;

        // An unsigned request still reports the configuration problem.
        let result = pipeline(config, api.clone()).process(b"{}", None).await;

        match result {
            PipelineResult::Failed(PipelineError::Config { missing }) => {
                assert_eq!(missing, vec!["DISCORD_BOT_TOKEN"]);
            }
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_signature_rejected_before_parsing() {
        let api = Arc::new(RecordingApi::default());
        let signature = sign_payload(b"{not json", "other-secret");

        let result = pipeline(config(), api.clone())
            .process(b"{not json", Some(&signature))
            .await;

        assert!(matches!(result, PipelineResult::Failed(PipelineError::Auth)));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let api = Arc::new(RecordingApi::default());
        let body = b"{not json".to_vec();
        let signature = sign_payload(&body, SECRET);

        let result = pipeline(config(), api.clone())
            .process(&body, Some(&signature))
            .await;

        assert!(matches!(result, PipelineResult::Failed(PipelineError::Parse(_))));
    }

    async fn process_signed(body: &[u8], api: Arc<RecordingApi>) -> PipelineResult {
        let signature = sign_payload(body, SECRET);
        pipeline(config(), api).process(body, Some(&signature)).await
    }

    #[tokio::test]
    async fn test_event_without_repository_ignored() {
        let api = Arc::new(RecordingApi::default());
        let body = br#"{"action":"member_added","organization":{"login":"octo-org"}}"#;

        let result = process_signed(body, api.clone()).await;

        assert!(matches!(result, PipelineResult::Ignored { ref action } if action == "member_added"));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_event_with_partial_issue_ignored() {
        let api = Arc::new(RecordingApi::default());
        let body = br#"{"action":"closed","issue":{"number":3,"title":"Old"}}"#;

        let result = process_signed(body, api.clone()).await;

        assert!(matches!(result, PipelineResult::Ignored { ref action } if action == "closed"));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_opened_event_with_partial_issue_is_parse_error() {
        let api = Arc::new(RecordingApi::default());
        let body = br#"{"action":"opened","issue":{"number":3,"title":"New"}}"#;

        let result = process_signed(body, api.clone()).await;

        assert!(matches!(result, PipelineResult::Failed(PipelineError::Parse(_))));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_reported() {
        let api = Arc::new(RecordingApi {
            fail: true,
            ..Default::default()
        });
        let body = payload("opened");
        let signature = sign_payload(&body, SECRET);

        let result = pipeline(config(), api.clone())
            .process(&body, Some(&signature))
            .await;

        match result {
            PipelineResult::Failed(PipelineError::Delivery(e)) => {
                assert_eq!(e.attempts(), 3);
                assert!(e.to_string().contains("connection reset"));
            }
            other => panic!("Expected delivery error, got {:?}", other),
        }
        assert_eq!(api.requests.lock().unwrap().len(), 3);
    }
}
