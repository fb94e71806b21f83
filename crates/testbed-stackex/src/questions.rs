//! Paginated question search.
//!
//! Page `p` is requested, every item is parsed independently, and the loop
//! moves to `p + 1` only while the response reports `has_more` and
//! `p < max_pages`. A failed page ends the fetch with whatever was already
//! collected.

use std::collections::HashSet;

use chrono::Utc;
use testbed_core::{Question, SearchFilter};
use tokio_util::sync::CancellationToken;

use crate::harvester::Harvester;
use crate::normalize::normalize_question;
use crate::transport::Transport;

const QUESTIONS_ENDPOINT: &str = "questions";

/// Why a fetch stopped. Logged only; callers get the records either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Exhausted,
    Capped,
    Failed,
    Cancelled,
}

impl Stop {
    fn as_str(self) -> &'static str {
        match self {
            Stop::Exhausted => "exhausted",
            Stop::Capped => "capped",
            Stop::Failed => "failed",
            Stop::Cancelled => "cancelled",
        }
    }
}

/// Query parameters for one search page.
pub(crate) fn search_params(filter: &SearchFilter, page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("order", "desc".to_owned()),
        ("sort", "votes".to_owned()),
        ("tagged", filter.tagged()),
        ("filter", "withbody".to_owned()),
        ("pagesize", filter.page_size().to_string()),
        ("page", page.to_string()),
        ("min", filter.min_score().to_string()),
    ];
    if filter.require_accepted_answer() {
        params.push(("accepted", "true".to_owned()));
    }
    params
}

impl<T: Transport> Harvester<T> {
    /// Fetches questions matching `filter`, in API order.
    ///
    /// Never fails: transport errors and cancellation end pagination early
    /// and return the questions gathered so far. Malformed items are skipped
    /// one by one, and a question id seen earlier in the same fetch is
    /// dropped.
    pub async fn fetch_questions(
        &self,
        filter: &SearchFilter,
        cancel: &CancellationToken,
    ) -> Vec<Question> {
        let tagged = filter.tagged();
        let mut questions: Vec<Question> = Vec::new();
        let mut seen: HashSet<i64> = HashSet::new();
        let mut page = 1u32;

        let stop = loop {
            if cancel.is_cancelled() {
                break Stop::Cancelled;
            }

            let params = search_params(filter, page);
            let response = match self
                .call(&self.page_pacer, QUESTIONS_ENDPOINT, &params, cancel)
                .await
            {
                None => break Stop::Cancelled,
                Some(Ok(response)) => response,
                Some(Err(e)) => {
                    self.stats.record_page_error();
                    tracing::warn!(
                        tagged = %tagged,
                        page,
                        kept = questions.len(),
                        error = %e,
                        "question page failed, keeping partial results"
                    );
                    break Stop::Failed;
                }
            };
            self.stats.record_page();
            let quota = response.quota();

            let fetched_at = Utc::now();
            let item_count = response.items.len();
            for item in response.items {
                match normalize_question(item, self.transport.site(), fetched_at) {
                    Ok(question) => {
                        if seen.insert(question.source_id) {
                            questions.push(question);
                        } else {
                            self.stats.record_duplicate();
                            tracing::debug!(
                                source_id = question.source_id,
                                "dropping repeated question"
                            );
                        }
                    }
                    Err(e) => {
                        self.stats.record_item_skipped();
                        tracing::warn!(
                            tagged = %tagged,
                            page,
                            error = %e,
                            "skipping malformed question item"
                        );
                    }
                }
            }

            tracing::info!(
                tagged = %tagged,
                page,
                items = item_count,
                quota_remaining = quota.remaining,
                has_more = quota.has_more_pages,
                "fetched question page"
            );

            if !quota.has_more_pages {
                break Stop::Exhausted;
            }
            if page >= filter.max_pages() {
                break Stop::Capped;
            }
            page += 1;
        };

        tracing::debug!(
            tagged = %tagged,
            pages = page,
            questions = questions.len(),
            stop = stop.as_str(),
            "question fetch finished"
        );
        questions
    }
}

#[cfg(test)]
#[path = "questions_test.rs"]
mod tests;
