//! Rendering of an opened issue into a Discord forum post.
//!
//! Lengths are counted in characters, never bytes, so truncation cannot split
//! a multi-byte character.

use crate::github::{Issue, Repository};

/// Discord rejects thread names longer than this.
pub const MAX_THREAD_NAME_LENGTH: usize = 100;

/// Discord rejects message content longer than this.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Descriptions beyond this are cut to leave room for the rest of the post.
pub const MAX_DESCRIPTION_LENGTH: usize = 1500;

const ELLIPSIS: &str = "...";
const TRUNCATION_NOTICE: &str = "...\n\n_[Description truncated]_";
const NO_LABELS: &str = "_No labels_";
const NO_DESCRIPTION: &str = "_No description provided_";

/// Thread name and opening post for one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub title: String,
    pub content: String,
}

/// Render an issue into its forum thread.
pub fn format_issue(issue: &Issue, repository: &Repository) -> ThreadMessage {
    ThreadMessage {
        title: thread_title(issue),
        content: format_issue_message(issue, repository),
    }
}

/// `[#<number>] <title>`, limited to [`MAX_THREAD_NAME_LENGTH`].
pub fn thread_title(issue: &Issue) -> String {
    truncate_with_ellipsis(
        &format!("[#{}] {}", issue.number, issue.title),
        MAX_THREAD_NAME_LENGTH,
    )
}

/// Body of the opening post.
pub fn format_issue_message(issue: &Issue, repository: &Repository) -> String {
    let labels = if issue.labels.is_empty() {
        NO_LABELS.to_string()
    } else {
        issue
            .labels
            .iter()
            .map(|label| format!("`{}`", label.name))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let description = truncate_description(issue.body.as_deref());

    let message = format!(
        "## New Issue in {repo}\n\
         \n\
         **Issue #{number}: {title}**\n\
         \n\
         **Repository:** {full_name}\n\
         **Author:** @{author}\n\
         **Labels:** {labels}\n\
         \n\
         **Description:**\n\
         {description}\n\
         \n\
         **View on GitHub:** {url}",
        repo = repository.name,
        number = issue.number,
        title = issue.title,
        full_name = repository.full_name,
        author = issue.author_login(),
        labels = labels,
        description = description,
        url = issue.html_url,
    );

    // The description budget covers ordinary titles; pathological titles or
    // repository names still must not exceed the API limit.
    truncate_with_ellipsis(&message, MAX_MESSAGE_LENGTH)
}

/// Keep the first `MAX_DESCRIPTION_LENGTH` characters and append a notice.
///
/// A missing or empty body becomes a placeholder.
pub fn truncate_description(body: Option<&str>) -> String {
    match body.filter(|b| !b.is_empty()) {
        None => NO_DESCRIPTION.to_string(),
        Some(body) => match body.char_indices().nth(MAX_DESCRIPTION_LENGTH) {
            Some((cut, _)) => format!("{}{}", &body[..cut], TRUNCATION_NOTICE),
            None => body.to_string(),
        },
    }
}

/// Cut `text` to at most `max` characters, the last three being `...`.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
