//! Retry with exponential back-off and jitter for transport calls.
//!
//! The transport itself never retries. The fetcher and enricher wrap each call
//! in [`retry_with_backoff`], which retries transient failures and hands every
//! other error straight back.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::rate_limit::sleep_or_cancel;
use crate::stats::HarvestStats;

/// Caller-side retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base delay: the n-th retry waits `backoff_base_ms * 2^(n-1)` ms ± 25%.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub const NONE: Self = Self {
        max_retries: 0,
        backoff_base_ms: 0,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** [`TransportError::Unreachable`] and
/// [`TransportError::RejectedRequest`] with status 429 or 5xx.
///
/// **Not retriable:** other rejected statuses, malformed bodies, and
/// construction errors.
#[must_use]
pub fn is_retriable(err: &TransportError) -> bool {
    match err {
        TransportError::Unreachable { .. } => true,
        TransportError::RejectedRequest { status, .. } => *status == 429 || *status >= 500,
        TransportError::MalformedResponse { .. }
        | TransportError::InvalidBaseUrl { .. }
        | TransportError::ClientBuild(_) => false,
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors. Delay is capped at 60 s.
///
/// The back-off wait aborts when `cancel` fires; the last error is returned
/// without another attempt.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    stats: &HarvestStats,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                stats.record_retry();
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient Stack Exchange error, retrying after back-off"
                );
                if !sleep_or_cancel(Duration::from_millis(delay_ms), cancel).await {
                    tracing::debug!(attempt, "retry back-off cancelled");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn rejected(status: u16) -> TransportError {
        TransportError::RejectedRequest {
            endpoint: "questions".to_owned(),
            status,
            body: String::new(),
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
        }
    }

    #[test]
    fn throttled_and_server_errors_are_retriable() {
        assert!(is_retriable(&rejected(429)));
        assert!(is_retriable(&rejected(500)));
        assert!(is_retriable(&rejected(503)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&rejected(400)));
        assert!(!is_retriable(&rejected(404)));
    }

    #[test]
    fn malformed_response_is_not_retriable() {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&TransportError::MalformedResponse {
            endpoint: "questions".to_owned(),
            source,
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let stats = HarvestStats::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &stats, &CancellationToken::new(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, TransportError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(stats.summary().retries, 0);
    }

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let stats = HarvestStats::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &stats, &CancellationToken::new(), || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rejected(503))
                } else {
                    Ok::<u32, TransportError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(stats.summary().retries, 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let stats = HarvestStats::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(2), &stats, &CancellationToken::new(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rejected(429))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 attempt + 2 retries");
        assert_eq!(result.unwrap_err().status(), Some(429));
    }

    #[tokio::test]
    async fn does_not_retry_bad_request() {
        let stats = HarvestStats::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(3), &stats, &CancellationToken::new(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rejected(400))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "400 must not be retried");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn no_retries_policy_tries_once() {
        let stats = HarvestStats::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let _ = retry_with_backoff(RetryPolicy::NONE, &stats, &CancellationToken::new(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rejected(500))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_back_off_returns_last_error_without_retrying() {
        let stats = HarvestStats::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let slow = RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 60_000,
        };
        let start = tokio::time::Instant::now();
        let result = retry_with_backoff(slow, &stats, &cancel, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rejected(503))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
