//! Retry with Exponential Backoff
//!
//! Transient provider failures (network hiccups, rate limits, 5xx) are
//! retried with doubling delays; permanent failures (auth, schema, bad
//! request) surface immediately.

use std::future::Future;
use std::time::Duration;

use crate::types::LlmResult;

/// Retry an async LLM operation with exponential backoff.
///
/// `max_attempts` counts the initial call. Only errors classified as
/// retryable by [`LlmError::is_retryable`] are retried; a rate-limit
/// `retry_after` hint overrides the computed delay when it is longer.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> LlmResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LlmResult<T>>,
{
    debug_assert!(max_attempts >= 1);
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts || !err.is_retryable() {
                    return Err(err);
                }
                let mut delay = base_delay * 2u32.saturating_pow(attempt - 1);
                if let Some(hint) = err.retry_after_secs() {
                    delay = delay.max(Duration::from_secs(hint));
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "LLM call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LlmError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn network_err() -> LlmError {
        LlmError::NetworkError {
            message: "connection reset".to_string(),
        }
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, LlmError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(network_err())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: LlmResult<u32> = retry_with_backoff(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(network_err()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: LlmResult<u32> = retry_with_backoff(5, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::SchemaMismatch {
                    message: "bad shape".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(LlmError::SchemaMismatch { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
