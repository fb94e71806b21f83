//! Category pipeline: fetch, truncate, enrich, and stamp each category in
//! turn, accumulating one ordered result set.

use futures::stream::{self, StreamExt};
use testbed_core::{Category, Question, Snapshot};
use tokio_util::sync::CancellationToken;

use crate::harvester::Harvester;
use crate::rate_limit::sleep_or_cancel;
use crate::stats::HarvestSummary;
use crate::transport::Transport;

/// Outcome of [`Harvester::run`].
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Every kept question, grouped by category in configuration order.
    pub questions: Vec<Question>,
    /// Questions kept per category, in the order categories were processed.
    pub per_category: Vec<(String, usize)>,
    /// `true` when the run stopped early on cancellation.
    pub cancelled: bool,
    pub summary: HarvestSummary,
}

impl HarvestReport {
    /// Wraps the harvested questions in a snapshot stamped with the current
    /// time.
    #[must_use]
    pub fn into_snapshot(self, source: &str) -> Snapshot {
        Snapshot::new(source, self.questions)
    }
}

impl<T: Transport> Harvester<T> {
    /// Runs every category in order and returns the accumulated questions.
    ///
    /// Each category contributes at most `count` questions (the first ones in
    /// fetch order). Kept questions with an accepted answer id are enriched;
    /// a failed lookup leaves `accepted_answer` empty. Every kept question is
    /// stamped with its category name. A category whose fetch fails part way
    /// contributes what it got and the run moves on.
    ///
    /// Cancellation stops the run after the current step; whatever was
    /// gathered so far is returned with `cancelled` set.
    pub async fn run(&self, categories: &[Category], cancel: &CancellationToken) -> HarvestReport {
        let mut questions: Vec<Question> = Vec::new();
        let mut per_category: Vec<(String, usize)> = Vec::with_capacity(categories.len());

        for (index, category) in categories.iter().enumerate() {
            if index > 0 && !sleep_or_cancel(self.limits.category_delay, cancel).await {
                break;
            }
            if cancel.is_cancelled() {
                break;
            }

            tracing::info!(
                category = %category.name,
                tagged = %category.filter.tagged(),
                count = category.count,
                "harvesting category"
            );

            let mut fetched = self.fetch_questions(&category.filter, cancel).await;
            let fetched_len = fetched.len();
            fetched.truncate(category.count);

            let mut kept = self.enrich_all(fetched, cancel).await;
            for question in &mut kept {
                question.category = Some(category.name.clone());
            }

            let answers = kept.iter().filter(|q| q.accepted_answer.is_some()).count();
            tracing::info!(
                category = %category.name,
                fetched = fetched_len,
                kept = kept.len(),
                answers,
                "category done"
            );

            per_category.push((category.name.clone(), kept.len()));
            questions.extend(kept);
        }

        let cancelled = cancel.is_cancelled();
        let summary = self.stats.summary();
        if cancelled {
            tracing::warn!(
                questions = questions.len(),
                categories_done = per_category.len(),
                categories_total = categories.len(),
                "harvest cancelled, returning partial results"
            );
        }
        tracing::info!(
            questions = questions.len(),
            pages = summary.pages_fetched,
            answers_attached = summary.answers_attached,
            absorbed_errors = summary.absorbed_errors(),
            cooldowns = summary.cooldowns,
            retries = summary.retries,
            "harvest finished"
        );

        HarvestReport {
            questions,
            per_category,
            cancelled,
            summary,
        }
    }

    /// Attaches accepted answers, keeping input order. Up to
    /// `enrich_concurrency` lookups run at once.
    async fn enrich_all(
        &self,
        questions: Vec<Question>,
        cancel: &CancellationToken,
    ) -> Vec<Question> {
        stream::iter(questions)
            .map(|mut question| async move {
                if let Some(answer_id) = question.accepted_answer_id {
                    if let Some(answer) = self.enrich(answer_id, cancel).await {
                        self.stats.record_answer_attached();
                        question.accepted_answer = Some(answer);
                    }
                }
                question
            })
            .buffered(self.enrich_concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
