//! Run counters. Every error the harvester absorbs is counted here so a
//! degraded run is visible even though it completes.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct HarvestStats {
    pages_fetched: AtomicU64,
    items_skipped: AtomicU64,
    duplicates_dropped: AtomicU64,
    page_errors: AtomicU64,
    answers_requested: AtomicU64,
    answers_attached: AtomicU64,
    answer_errors: AtomicU64,
    cooldowns: AtomicU64,
    retries: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl HarvestStats {
    pub(crate) fn record_page(&self) {
        bump(&self.pages_fetched);
    }

    pub(crate) fn record_item_skipped(&self) {
        bump(&self.items_skipped);
    }

    pub(crate) fn record_duplicate(&self) {
        bump(&self.duplicates_dropped);
    }

    pub(crate) fn record_page_error(&self) {
        bump(&self.page_errors);
    }

    pub(crate) fn record_answer_requested(&self) {
        bump(&self.answers_requested);
    }

    pub(crate) fn record_answer_attached(&self) {
        bump(&self.answers_attached);
    }

    pub(crate) fn record_answer_error(&self) {
        bump(&self.answer_errors);
    }

    pub(crate) fn record_cooldown(&self) {
        bump(&self.cooldowns);
    }

    pub(crate) fn record_retry(&self) {
        bump(&self.retries);
    }

    #[must_use]
    pub fn summary(&self) -> HarvestSummary {
        HarvestSummary {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            items_skipped: self.items_skipped.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            page_errors: self.page_errors.load(Ordering::Relaxed),
            answers_requested: self.answers_requested.load(Ordering::Relaxed),
            answers_attached: self.answers_attached.load(Ordering::Relaxed),
            answer_errors: self.answer_errors.load(Ordering::Relaxed),
            cooldowns: self.cooldowns.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`HarvestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub pages_fetched: u64,
    pub items_skipped: u64,
    pub duplicates_dropped: u64,
    pub page_errors: u64,
    pub answers_requested: u64,
    pub answers_attached: u64,
    pub answer_errors: u64,
    pub cooldowns: u64,
    pub retries: u64,
}

impl HarvestSummary {
    /// Errors swallowed during the run: malformed items, failed pages, and
    /// failed answer fetches.
    #[must_use]
    pub fn absorbed_errors(&self) -> u64 {
        self.items_skipped + self.page_errors + self.answer_errors
    }
}
