//! Bounded retry with exponential, jittered backoff.
//!
//! Every outbound call made by a provider goes through [`with_retry`]. Only
//! errors classified [`RetryClass::WithBackoff`] are repeated; anything else,
//! and the error of the final attempt, is returned exactly as the operation
//! produced it.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::errors::{MarketDataError, RetryClass};

/// Default number of attempts per call.
pub const DEFAULT_ATTEMPTS: u32 = 3;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(300);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Retry configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub attempts: u32,
    /// Delay before the second attempt; doubles afterwards.
    pub base_delay: Duration,
    /// Upper bound for any single delay, jitter included.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Same attempt count as the default, without sleeping between attempts.
    pub fn no_delay() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the failed attempt with index `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.min(16));
        let delay = self.base_delay.saturating_mul(multiplier).min(self.max_delay);

        let jitter_ms = (delay.as_millis() / 2) as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        } else {
            Duration::ZERO
        };

        (delay + jitter).min(self.max_delay)
    }
}

/// Run `operation` under `policy`.
///
/// The closure is invoked once per attempt so each attempt gets a fresh
/// future.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, MarketDataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketDataError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= attempts || err.retry_class() != RetryClass::WithBackoff {
                    return Err(err);
                }

                let delay = policy.delay_for(attempt - 1);
                debug!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt, attempts, err, delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> MarketDataError {
        MarketDataError::HttpStatus {
            url: "https://example.test".to_string(),
            status: 502,
        }
    }

    #[tokio::test]
    async fn test_returns_first_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&RetryPolicy::no_delay(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, MarketDataError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&RetryPolicy::no_delay(), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(transient())
            } else {
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_final_error_is_returned_unchanged() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&RetryPolicy::no_delay(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transient())
        })
        .await;

        assert!(matches!(
            result,
            Err(MarketDataError::HttpStatus { status: 502, .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), DEFAULT_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_data_error_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&RetryPolicy::no_delay(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketDataError::EmptyOrderbook)
        })
        .await;

        assert!(matches!(result, Err(MarketDataError::EmptyOrderbook)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let first = policy.delay_for(0);
            assert!(first >= Duration::from_millis(300));
            assert!(first <= Duration::from_millis(450));

            let second = policy.delay_for(1);
            assert!(second >= Duration::from_millis(600));
            assert!(second <= Duration::from_millis(900));

            assert_eq!(policy.delay_for(10), Duration::from_secs(2));
        }
    }
}
