//! Harvested records and the snapshot that persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question returned by the search endpoint.
///
/// `category` is stamped by the orchestrator after the fetch; `accepted_answer`
/// is present only when `accepted_answer_id` was set and the answer fetch
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Site the question was harvested from (e.g. `stackoverflow`).
    pub source: String,
    pub source_id: i64,
    pub url: String,
    pub title: String,
    /// Raw HTML body, kept verbatim.
    pub body: String,
    pub tags: Vec<String>,
    pub score: i64,
    pub view_count: i64,
    pub answer_count: i64,
    pub is_answered: bool,
    pub accepted_answer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub category: Option<String>,
    pub accepted_answer: Option<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub body: String,
    pub score: i64,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// The single persisted artifact of one harvest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub count: usize,
    pub questions: Vec<Question>,
}

impl Snapshot {
    /// Wraps `questions` with provenance stamped at the current time.
    #[must_use]
    pub fn new(source: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            source: source.into(),
            fetched_at: Utc::now(),
            count: questions.len(),
            questions,
        }
    }

    /// Number of questions per category, in first-seen order. Unstamped
    /// questions are grouped under `"uncategorized"`.
    #[must_use]
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for question in &self.questions {
            let name = question.category.as_deref().unwrap_or("uncategorized");
            match counts.iter_mut().find(|(n, _)| n == name) {
                Some((_, c)) => *c += 1,
                None => counts.push((name.to_string(), 1)),
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, category: Option<&str>) -> Question {
        Question {
            source: "stackoverflow".to_string(),
            source_id: id,
            url: format!("https://stackoverflow.com/q/{id}"),
            title: format!("Question {id}"),
            body: "<p>body</p>".to_string(),
            tags: vec!["rust".to_string()],
            score: 1,
            view_count: 10,
            answer_count: 0,
            is_answered: false,
            accepted_answer_id: None,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            fetched_at: DateTime::from_timestamp(1_700_000_100, 0).unwrap(),
            category: category.map(str::to_string),
            accepted_answer: None,
        }
    }

    #[test]
    fn snapshot_new_counts_questions() {
        let snapshot = Snapshot::new(
            "Stack Overflow API",
            vec![question(1, None), question(2, None)],
        );
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.source, "Stack Overflow API");
    }

    #[test]
    fn category_counts_keep_first_seen_order() {
        let snapshot = Snapshot::new(
            "test",
            vec![
                question(1, Some("b")),
                question(2, Some("a")),
                question(3, Some("b")),
                question(4, None),
            ],
        );
        assert_eq!(
            snapshot.category_counts(),
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 1),
                ("uncategorized".to_string(), 1),
            ]
        );
    }

    #[test]
    fn snapshot_serializes_with_questions_key() {
        let snapshot = Snapshot::new("test", vec![question(7, Some("rust"))]);
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["questions"][0]["source_id"], 7);
        assert_eq!(value["questions"][0]["category"], "rust");
        assert!(value["questions"][0]["accepted_answer"].is_null());
    }
}
