//! Stack Exchange API wire types.
//!
//! Every response shares the same wrapper: an `items` array plus paging and
//! quota fields. Items are kept as raw JSON so a single malformed entry can be
//! dropped without losing the rest of the page.

use serde::Deserialize;

/// Common response wrapper for all Stack Exchange endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
    /// Requests left in the current quota window. Absent on some error paths.
    #[serde(default)]
    pub quota_remaining: Option<i64>,
    #[serde(default)]
    pub quota_max: Option<i64>,
    /// Seconds the provider asks clients to wait before hitting the same
    /// method again.
    #[serde(default)]
    pub backoff: Option<u64>,
}

impl ApiResponse {
    #[must_use]
    pub fn quota(&self) -> QuotaState {
        QuotaState {
            remaining: self.quota_remaining,
            has_more_pages: self.has_more,
            backoff_secs: self.backoff,
        }
    }
}

/// Paging and quota signals read from one response. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    pub remaining: Option<i64>,
    pub has_more_pages: bool,
    /// Provider-requested wait before the next call, if any.
    pub backoff_secs: Option<u64>,
}

/// A question item from `/questions` (requested with the `withbody` filter).
#[derive(Debug, Deserialize)]
pub struct QuestionItem {
    pub question_id: i64,
    pub link: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub answer_count: i64,
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default)]
    pub accepted_answer_id: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub creation_date: i64,
}

/// An answer item from `/answers/{id}`.
#[derive(Debug, Deserialize)]
pub struct AnswerItem {
    pub answer_id: i64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub creation_date: i64,
}
