use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tracing::warn;

use crate::error::UpstreamError;

/// Retry tuning per §4.1: exponential backoff, base 500ms, factor 2, ±10%
/// jitter, max delay 15s, attempt budget <= 3.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            max_attempts: 3,
        }
    }
}

/// Retries `op` up to `cfg.max_attempts` times, sleeping with jittered
/// exponential backoff between attempts. Stops immediately (without
/// sleeping) when the error is not retryable.
pub async fn retry_with_backoff<F, Fut, T>(cfg: RetryConfig, mut op: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let delays: Vec<Duration> = ExponentialBackoff::from_millis(2)
        .factor(cfg.base_delay.as_millis() as u64)
        .map(jitter)
        .map(|d| d.min(cfg.max_delay))
        .take(cfg.max_attempts.saturating_sub(1))
        .collect();

    let mut attempt = 0usize;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.retryable() && attempt < cfg.max_attempts => {
                let delay = delays.get(attempt - 1).copied().unwrap_or(cfg.base_delay);
                warn!(attempt, kind = e.kind(), delay_ms = delay.as_millis() as u64, "retrying upstream call");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, UpstreamError> = retry_with_backoff(
            RetryConfig {
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(10),
                max_attempts: 3,
            },
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_retryable_errors_up_to_budget() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, UpstreamError> = retry_with_backoff(
            RetryConfig {
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(10),
                max_attempts: 3,
            },
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(UpstreamError::http_status(503)) }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_terminal_errors() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, UpstreamError> = retry_with_backoff(
            RetryConfig {
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(10),
                max_attempts: 3,
            },
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(UpstreamError::http_status(404)) }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
