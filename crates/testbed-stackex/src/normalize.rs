//! Conversion of raw API items into harvested records.
//!
//! Each item is parsed on its own so that one bad entry only costs that entry.

use chrono::{DateTime, Utc};
use testbed_core::{Answer, Question};

use crate::types::{AnswerItem, QuestionItem};

/// Why a single item could not be turned into a record.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("item does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("creation_date {0} is out of range")]
    Timestamp(i64),
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, ItemError> {
    DateTime::from_timestamp(secs, 0).ok_or(ItemError::Timestamp(secs))
}

/// Parses one `/questions` item. `category` and `accepted_answer` start empty.
///
/// # Errors
///
/// Returns [`ItemError`] when required fields (`question_id`, `link`,
/// `title`) are missing or mistyped, or the creation date is unrepresentable.
pub fn normalize_question(
    item: serde_json::Value,
    source: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Question, ItemError> {
    let raw: QuestionItem = serde_json::from_value(item)?;
    Ok(Question {
        source: source.to_owned(),
        source_id: raw.question_id,
        url: raw.link,
        title: raw.title,
        body: raw.body,
        tags: raw.tags,
        score: raw.score,
        view_count: raw.view_count,
        answer_count: raw.answer_count,
        is_answered: raw.is_answered,
        accepted_answer_id: raw.accepted_answer_id,
        created_at: timestamp(raw.creation_date)?,
        fetched_at,
        category: None,
        accepted_answer: None,
    })
}

/// Parses one `/answers/{id}` item.
///
/// # Errors
///
/// Returns [`ItemError`] when `answer_id` is missing or the item is mistyped.
pub fn normalize_answer(item: serde_json::Value) -> Result<Answer, ItemError> {
    let raw: AnswerItem = serde_json::from_value(item)?;
    Ok(Answer {
        id: raw.answer_id,
        body: raw.body,
        score: raw.score,
        is_accepted: raw.is_accepted,
        created_at: timestamp(raw.creation_date)?,
    })
}
