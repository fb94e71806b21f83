//! Accepted-answer lookup for a single question.

use testbed_core::Answer;
use tokio_util::sync::CancellationToken;

use crate::harvester::Harvester;
use crate::normalize::normalize_answer;
use crate::transport::Transport;

fn answer_params() -> [(&'static str, String); 3] {
    [
        ("filter", "withbody".to_owned()),
        ("order", "desc".to_owned()),
        ("sort", "votes".to_owned()),
    ]
}

impl<T: Transport> Harvester<T> {
    /// Fetches the accepted answer `answer_id`.
    ///
    /// Returns `None` on any transport error, on an empty result, on a
    /// malformed item, or when cancelled. Only the first item is used if the
    /// API returns several.
    pub async fn enrich(&self, answer_id: i64, cancel: &CancellationToken) -> Option<Answer> {
        if cancel.is_cancelled() {
            return None;
        }

        let endpoint = format!("answers/{answer_id}");
        self.stats.record_answer_requested();

        let response = match self
            .call(&self.answer_pacer, &endpoint, &answer_params(), cancel)
            .await?
        {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_answer_error();
                tracing::warn!(answer_id, error = %e, "answer fetch failed, leaving it unattached");
                return None;
            }
        };

        if response.items.len() > 1 {
            tracing::debug!(
                answer_id,
                items = response.items.len(),
                "answer lookup returned several items, using the first"
            );
        }
        let Some(item) = response.items.into_iter().next() else {
            tracing::debug!(answer_id, "answer lookup returned no items");
            return None;
        };

        match normalize_answer(item) {
            Ok(answer) => Some(answer),
            Err(e) => {
                self.stats.record_item_skipped();
                tracing::warn!(answer_id, error = %e, "skipping malformed answer item");
                None
            }
        }
    }
}
