//! Retry with exponential backoff for vendor page fetches.
//!
//! Only transient failures are retried: HTTP 429 and network-level errors
//! (connection reset, timeout). A 404, a bad status, or an unparseable body
//! is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Longest `Retry-After` we are willing to honor, in seconds.
const MAX_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Wait before retry `n` (0-based) is `backoff_base_secs * 2^n`.
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    fn is_retriable(err: &ScraperError) -> bool {
        matches!(
            err,
            ScraperError::RateLimited { .. } | ScraperError::Http(_)
        )
    }

    /// Delay before retry number `attempt` (0-based).
    ///
    /// A 429 that names a longer `Retry-After` than the backoff gets the
    /// server's value, capped at [`MAX_RETRY_AFTER_SECS`].
    fn delay(&self, attempt: u32, err: &ScraperError) -> Duration {
        let backoff = self
            .backoff_base_secs
            .saturating_mul(1u64 << attempt.min(62));
        let secs = match err {
            ScraperError::RateLimited {
                retry_after_secs, ..
            } if self.backoff_base_secs > 0 => backoff.max((*retry_after_secs).min(MAX_RETRY_AFTER_SECS)),
            _ => backoff,
        };
        Duration::from_secs(secs)
    }

    /// Runs `operation` until it succeeds, fails with a non-retriable error,
    /// or retries are exhausted (then the last error is returned).
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !Self::is_retriable(&err) || attempt >= self.max_retries {
                return Err(err);
            }

            let delay = self.delay(attempt, &err);
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_secs = delay.as_secs(),
                error = %err,
                "transient fetch error, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn rate_limited(retry_after_secs: u64) -> ScraperError {
        ScraperError::RateLimited {
            domain: "worldspice.com".to_owned(),
            retry_after_secs,
        }
    }

    fn no_wait(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            backoff_base_secs: 0,
        }
    }

    /// Runs a policy over an operation that fails `failures` times with `make_err`.
    async fn count_calls(
        policy: RetryPolicy,
        failures: u32,
        make_err: fn() -> ScraperError,
    ) -> (Result<u32, ScraperError>, u32) {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = policy
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    if n < failures {
                        Err(make_err())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_is_returned_without_retry() {
        let (result, calls) = count_calls(no_wait(3), 0, || rate_limited(0)).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn rate_limited_is_retried_until_success() {
        let (result, calls) = count_calls(no_wait(3), 2, || rate_limited(0)).await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn last_error_returned_when_retries_run_out() {
        let (result, calls) = count_calls(no_wait(2), u32::MAX, || rate_limited(0)).await;
        assert_eq!(calls, 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let (result, calls) = count_calls(no_wait(3), u32::MAX, || ScraperError::NotFound {
            url: "https://worldspice.com/products/cumin.js".to_owned(),
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ScraperError::NotFound { .. })));
    }

    #[tokio::test]
    async fn bad_status_is_not_retried() {
        let (result, calls) =
            count_calls(no_wait(3), u32::MAX, || ScraperError::UnexpectedStatus {
                status: 503,
                url: "https://worldspice.com/collections/all?page=1".to_owned(),
            })
            .await;
        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(ScraperError::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_retries: 5,
            backoff_base_secs: 2,
        };
        let err = ScraperError::NotFound {
            url: String::new(),
        };
        assert_eq!(policy.delay(0, &err), Duration::from_secs(2));
        assert_eq!(policy.delay(1, &err), Duration::from_secs(4));
        assert_eq!(policy.delay(3, &err), Duration::from_secs(16));
    }

    #[test]
    fn delay_honors_longer_retry_after_with_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            backoff_base_secs: 1,
        };
        assert_eq!(policy.delay(0, &rate_limited(30)), Duration::from_secs(30));
        assert_eq!(policy.delay(0, &rate_limited(3600)), Duration::from_secs(120));
        assert_eq!(policy.delay(6, &rate_limited(30)), Duration::from_secs(64));
    }

    #[test]
    fn zero_backoff_ignores_retry_after() {
        assert_eq!(no_wait(1).delay(0, &rate_limited(60)), Duration::ZERO);
    }
}
