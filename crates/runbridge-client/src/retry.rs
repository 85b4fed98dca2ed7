//! Exponential backoff around a single outbound request.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// How many times, and how patiently, a retryable failure is re-issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Delay before the first retry; doubled after each retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Nominal delay before retry number `retry` (0-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Execute an async operation with exponential backoff retry.
///
/// Retries only errors classified as retryable (`Error::is_retryable`).
/// Non-retryable errors are returned immediately; when the budget is spent
/// the final error is wrapped in `Error::RetriesExhausted`.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, label: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let err = match f().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if !err.is_retryable() {
            return Err(err);
        }

        if attempt > policy.max_retries {
            return Err(Error::RetriesExhausted {
                attempts: attempt,
                source: Box::new(err),
            });
        }

        tracing::warn!(
            request = label,
            attempt = attempt,
            max_retries = policy.max_retries,
            backoff_ms = backoff.as_millis() as u64,
            error = %err,
            "Request failed, retrying"
        );
        tokio::time::sleep(backoff).await;
        backoff = backoff.saturating_mul(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> Error {
        Error::Server {
            status: 502,
            message: "bad gateway".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_for(0), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_server_errors_until_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::default(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(Error::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 4);
                assert!(source.is_server_error());
            }
            other => panic!("expected exhausted retries, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles() {
        let start = tokio::time::Instant::now();
        let _: Result<()> = with_retry(&RetryPolicy::default(), "test", || async {
            Err(Error::rate_limited())
        })
        .await;
        // 200 + 400 + 800
        assert_eq!(start.elapsed(), Duration::from_millis(1400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::default(), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(Error::rate_limited())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::default(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(Error::Api {
                    status: 400,
                    message: "invalid input".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_none_policy_single_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retry(&RetryPolicy::none(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(Error::RetriesExhausted { attempts: 1, .. })
        ));
    }
}
