//! Request pacing for the Stack Exchange API.
//!
//! Two independent policies:
//!
//! - [`Pacer`]: steady leaky-bucket spacing, one request per `interval` per
//!   logical stream. Pagination and answer enrichment each own a pacer.
//! - [`QuotaGuard`]: coarse cooldown shared by every stream. Armed when a
//!   response reports `quota_remaining` below the low-water mark, or carries a
//!   provider `backoff`. The cooldown is paid by the next request, so a run
//!   that has nothing left to ask for never waits on it.
//!
//! All waits return `false` when the cancellation token fires first.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::types::QuotaState;

/// Timing knobs for a harvest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    /// Minimum spacing between consecutive requests on one stream.
    pub inter_request_delay: Duration,
    /// Pause between two categories.
    pub category_delay: Duration,
    /// `quota_remaining` below this arms the cooldown.
    pub quota_low_water: i64,
    pub quota_cooldown: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            inter_request_delay: Duration::from_millis(500),
            category_delay: Duration::from_secs(2),
            quota_low_water: 10,
            quota_cooldown: Duration::from_secs(60),
        }
    }
}

impl RateLimits {
    /// No pacing and no cooldown. Quota observations never arm anything.
    #[must_use]
    pub fn unthrottled() -> Self {
        Self {
            inter_request_delay: Duration::ZERO,
            category_delay: Duration::ZERO,
            quota_low_water: i64::MIN,
            quota_cooldown: Duration::ZERO,
        }
    }
}

/// Sleeps until `deadline`. Returns `false` if `cancel` fired first.
pub(crate) async fn sleep_until_or_cancel(deadline: Instant, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep_until(deadline) => true,
    }
}

/// Sleeps for `duration`. Returns `false` if `cancel` fired first.
pub(crate) async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    sleep_until_or_cancel(Instant::now() + duration, cancel).await
}

/// Leaky-bucket slot scheduler for one request stream.
///
/// The first request goes out immediately; each later one is scheduled at
/// least `interval` after the previous slot. Slots are reserved under a lock
/// and slept on outside it, so concurrent callers queue in arrival order.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits for this stream's next slot.
    pub async fn ready(&self, cancel: &CancellationToken) -> bool {
        let slot = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };

        if slot > Instant::now() {
            tracing::debug!(
                wait_ms = slot.saturating_duration_since(Instant::now()).as_millis(),
                "pacing request"
            );
            sleep_until_or_cancel(slot, cancel).await
        } else {
            !cancel.is_cancelled()
        }
    }
}

/// Shared quota-triggered cooldown.
#[derive(Debug)]
pub struct QuotaGuard {
    low_water: i64,
    cooldown: Duration,
    resume_at: Mutex<Option<Instant>>,
}

impl QuotaGuard {
    #[must_use]
    pub fn new(low_water: i64, cooldown: Duration) -> Self {
        Self {
            low_water,
            cooldown,
            resume_at: Mutex::new(None),
        }
    }

    /// Records the quota signals of a response. Returns `true` when this
    /// response armed (or extended) a cooldown.
    pub fn observe(&self, quota: &QuotaState) -> bool {
        let now = Instant::now();
        let mut wait: Option<Duration> = None;

        if let Some(remaining) = quota.remaining {
            if remaining < self.low_water && !self.cooldown.is_zero() {
                tracing::warn!(
                    quota_remaining = remaining,
                    low_water = self.low_water,
                    cooldown_secs = self.cooldown.as_secs(),
                    "API quota low, cooling down before the next request"
                );
                wait = Some(self.cooldown);
            }
        }

        if let Some(secs) = quota.backoff_secs.filter(|s| *s > 0) {
            tracing::warn!(backoff_secs = secs, "provider requested back-off");
            let backoff = Duration::from_secs(secs);
            wait = Some(wait.map_or(backoff, |w| w.max(backoff)));
        }

        let Some(wait) = wait else {
            return false;
        };

        let target = now + wait;
        let mut resume_at = self
            .resume_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match *resume_at {
            Some(existing) if existing >= target => false,
            _ => {
                *resume_at = Some(target);
                true
            }
        }
    }

    /// `true` while a cooldown deadline lies in the future.
    #[must_use]
    pub fn is_cooling(&self) -> bool {
        self.deadline().is_some_and(|at| at > Instant::now())
    }

    fn deadline(&self) -> Option<Instant> {
        *self
            .resume_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Waits out any armed cooldown, including one extended while waiting.
    pub async fn wait(&self, cancel: &CancellationToken) -> bool {
        loop {
            match self.deadline() {
                Some(at) if at > Instant::now() => {
                    tracing::info!(
                        wait_secs = at.saturating_duration_since(Instant::now()).as_secs(),
                        "waiting for quota cooldown"
                    );
                    if !sleep_until_or_cancel(at, cancel).await {
                        return false;
                    }
                }
                _ => return !cancel.is_cancelled(),
            }
        }
    }
}
