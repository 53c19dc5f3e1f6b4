//! Bounded exponential backoff for vendor fetches.

use positioning_core::{Result, RetryConfig};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The delay doubles after every failure and is
/// capped at `max_delay_ms`.
///
/// # Errors
/// Returns the last error once retries are exhausted, or the first
/// non-retryable error.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let max_delay = Duration::from_millis(config.max_delay_ms);
    let mut delay = Duration::from_millis(config.initial_delay_ms).min(max_delay);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    attempt,
                    delay = ?delay,
                    "{} failed: {}; retrying", label, err
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(max_delay);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use positioning_core::PositioningError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 4,
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(&fast_retry(3), "fetch", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(PositioningError::connectivity("reset"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = with_retry(&fast_retry(3), "fetch", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(PositioningError::connectivity("timed out"))
        })
        .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_validation_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = with_retry(&fast_retry(5), "fetch", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(PositioningError::validation("bad payload"))
        })
        .await;

        assert!(matches!(result, Err(PositioningError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = with_retry(&fast_retry(0), "fetch", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, PositioningError>(())
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
