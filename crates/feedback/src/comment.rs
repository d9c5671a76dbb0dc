use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::text::{excerpt, EXCERPT_MAX_CHARS};

/// Phrases that mark a comment as a question even without a literal `?`.
const QUESTION_CUES: &[&str] = &[
    "can you",
    "could you",
    "should we",
    "should i",
    "what do you think",
    "any thoughts",
    "any update",
    "wondering if",
    "is it possible",
    "how do we",
    "how should",
    "wdyt",
];

/// A comment as fetched from a platform, before classification. Both
/// clients reduce their payloads to this shape so the aggregator never
/// sees provider-specific JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComment {
    pub id: String,
    pub item_label: String,
    pub item_url: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A classified comment as the dashboard shows it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackComment {
    pub id: String,
    /// "linear" or "notion".
    pub platform: String,
    pub item_label: String,
    pub item_url: String,
    pub author: String,
    /// Body capped at 300 chars; the remainder is discarded.
    pub excerpt: String,
    pub created_at: DateTime<Utc>,
    pub is_question: bool,
    /// A question I asked myself, still unanswered as far as we know.
    /// Questions from anyone else are never pending, whatever their
    /// thread state. The asymmetry is deliberate.
    pub is_pending: bool,
}

/// Shortcut into the source thread, shown next to the comment list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuickLink {
    pub label: String,
    pub url: String,
}

pub fn is_question(body: &str) -> bool {
    if body.contains('?') {
        return true;
    }
    let lower = body.to_lowercase();
    QUESTION_CUES.iter().any(|cue| lower.contains(cue))
}

/// True when `author` matches one of the operator's own account
/// spellings, by case-insensitive substring in either direction.
pub fn is_self(author: &str, self_names: &[String]) -> bool {
    let lower = author.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    self_names.iter().any(|name| {
        let name = name.trim().to_lowercase();
        !name.is_empty() && (lower.contains(&name) || name.contains(&lower))
    })
}

pub fn classify(raw: RawComment, platform: &str, self_names: &[String]) -> FeedbackComment {
    let question = is_question(&raw.body);
    let pending = question && is_self(&raw.author, self_names);
    FeedbackComment {
        id: raw.id,
        platform: platform.to_string(),
        item_label: raw.item_label,
        item_url: raw.item_url,
        author: raw.author,
        excerpt: excerpt(&raw.body, EXCERPT_MAX_CHARS),
        created_at: raw.created_at,
        is_question: question,
        is_pending: pending,
    }
}
