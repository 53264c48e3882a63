//! GitHub `issues` webhook payload types and event classification.
//!
//! Only the fields the relay renders are modelled; everything else GitHub
//! sends is ignored during deserialization.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// The only action that results in a forum thread.
pub const OPENED_ACTION: &str = "opened";

/// Payload of a GitHub `issues` webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEvent {
    /// Action type (e.g. "opened", "closed", "edited").
    ///
    /// Events without an action, such as `ping`, parse with an empty string.
    #[serde(default)]
    pub action: String,
    /// Issue details; absent for non-issue events
    #[serde(default)]
    pub issue: Option<Issue>,
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    /// Description; GitHub sends `null` when empty
    #[serde(default)]
    pub body: Option<String>,
    /// Browser URL of the issue
    pub html_url: String,
    pub user: User,
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Hex color without the leading `#`
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Short name, e.g. "relay"
    pub name: String,
    /// Owner-qualified name, e.g. "octo-org/relay"
    pub full_name: String,
}

impl Issue {
    /// Login of the user who opened the issue.
    pub fn author_login(&self) -> &str {
        &self.user.login
    }
}

/// The few top-level fields needed to decide whether a payload matters.
///
/// Any JSON object parses, whatever hook sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub action: String,
    /// Present and not `null`; its contents are not looked at here
    #[serde(default)]
    pub issue: Option<IgnoredAny>,
    #[serde(default)]
    pub repository: Option<EnvelopeRepository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvelopeRepository {
    #[serde(default)]
    pub full_name: Option<String>,
}

impl EventEnvelope {
    pub fn from_slice(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    /// `owner/repo` if the payload names one.
    pub fn repository_name(&self) -> &str {
        self.repository
            .as_ref()
            .and_then(|r| r.full_name.as_deref())
            .unwrap_or("unknown")
    }
}

/// Outcome of classifying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub actionable: bool,
}

impl IssueEvent {
    /// Parse the full issue shape from the raw webhook body.
    ///
    /// Only needed for actionable events; classify the [`EventEnvelope`] first.
    pub fn from_slice(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    /// The issue, when this event should produce a thread.
    pub fn opened_issue(&self) -> Option<&Issue> {
        if self.action == OPENED_ACTION {
            self.issue.as_ref()
        } else {
            None
        }
    }
}

/// Decide whether an event triggers delivery.
///
/// Actionable iff the action is `opened` and the issue is present. Anything
/// else is acknowledged and ignored, not rejected.
pub fn classify(event: &EventEnvelope) -> Classification {
    Classification {
        actionable: event.action == OPENED_ACTION && event.issue.is_some(),
    }
}
