//! The harvester: one transport plus the pacing, quota, retry, and counter
//! state shared by the question fetcher, the answer enricher, and the
//! category pipeline.
//!
//! The fetch, enrich, and pipeline operations live in `questions.rs`,
//! `answers.rs`, and `pipeline.rs` as further `impl Harvester` blocks.

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::rate_limit::{Pacer, QuotaGuard, RateLimits};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::stats::HarvestStats;
use crate::transport::Transport;
use crate::types::ApiResponse;

pub struct Harvester<T> {
    pub(crate) transport: T,
    pub(crate) limits: RateLimits,
    pub(crate) retry: RetryPolicy,
    /// Pagination stream.
    pub(crate) page_pacer: Pacer,
    /// Enrichment stream.
    pub(crate) answer_pacer: Pacer,
    pub(crate) quota: QuotaGuard,
    pub(crate) stats: HarvestStats,
    pub(crate) enrich_concurrency: usize,
}

impl<T: Transport> Harvester<T> {
    #[must_use]
    pub fn new(transport: T, limits: RateLimits, retry: RetryPolicy) -> Self {
        Self {
            transport,
            limits,
            retry,
            page_pacer: Pacer::new(limits.inter_request_delay),
            answer_pacer: Pacer::new(limits.inter_request_delay),
            quota: QuotaGuard::new(limits.quota_low_water, limits.quota_cooldown),
            stats: HarvestStats::default(),
            enrich_concurrency: 1,
        }
    }

    /// Number of answer fetches allowed in flight at once (minimum 1). The
    /// enrichment pacer still spaces their start times.
    #[must_use]
    pub fn with_enrich_concurrency(mut self, concurrency: usize) -> Self {
        self.enrich_concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn stats(&self) -> &HarvestStats {
        &self.stats
    }

    /// Issues one quota-aware, paced, retried transport call.
    ///
    /// Every attempt, retries included, first waits out any quota cooldown and
    /// then takes a slot from `pacer`. Returns `None` if `cancel` fires while
    /// waiting for a slot.
    pub(crate) async fn call(
        &self,
        pacer: &Pacer,
        endpoint: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Option<Result<ApiResponse, TransportError>> {
        let result = retry_with_backoff(self.retry, &self.stats, cancel, || async move {
            if !self.quota.wait(cancel).await || !pacer.ready(cancel).await {
                return Ok(None);
            }
            self.transport.request(endpoint, params).await.map(Some)
        })
        .await;

        match result {
            Ok(None) => None,
            Ok(Some(response)) => {
                if self.quota.observe(&response.quota()) {
                    self.stats.record_cooldown();
                }
                Some(Ok(response))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
