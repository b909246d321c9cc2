use std::future::Future;
use std::time::Duration;

use super::classification::ErrorClassification;
use super::types::XaiError;
use tracing::warn;

impl ErrorClassification {
    /// Exponential backoff `2^attempt` seconds plus up to one second of
    /// jitter, capped at 30s. `attempt` is 0-indexed.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let base: f64 = 2.0_f64.powi(attempt as i32);
        let jitter: f64 = rand::random::<f64>();
        Duration::from_secs_f64((base + jitter).min(30.0))
    }
}

/// Retry configuration for upstream inference calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Zero delay between attempts. Used by tests.
    pub immediate: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            immediate: false,
        }
    }
}

/// Execute an async operation, retrying while the error classifies as
/// retryable and the attempt budget lasts.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, XaiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, XaiError>>,
{
    let max_attempts = config.max_retries + 1;

    for attempt in 0..max_attempts {
        match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classification = e.classify();

                if !classification.retryable || attempt + 1 >= max_attempts {
                    if classification.retryable {
                        warn!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            max = max_attempts,
                            "Max retries exhausted"
                        );
                    }
                    return Err(e);
                }

                let delay = if config.immediate {
                    Duration::ZERO
                } else {
                    classification.retry_delay(attempt)
                };
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max = max_attempts,
                    error_type = classification.error_type,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after error"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(XaiError::Internal("Retry loop exited unexpectedly".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_retry_delay_exponential_and_capped() {
        let class = ErrorClassification { error_type: "NetworkError", retryable: true };
        let d0 = class.retry_delay(0);
        let d1 = class.retry_delay(1);
        assert!(d0.as_secs_f64() >= 1.0 && d0.as_secs_f64() < 2.0);
        assert!(d1.as_secs_f64() >= 2.0 && d1.as_secs_f64() < 3.0);
        assert_eq!(class.retry_delay(10), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_first_try() {
        let config = RetryConfig { max_retries: 2, immediate: true };
        let result = with_retry("test", &config, || async { Ok::<_, XaiError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_retry_recovers_from_network_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let config = RetryConfig { max_retries: 2, immediate: true };

        let result = with_retry("test", &config, || {
            let attempts = attempts.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(XaiError::Network("reset".into()))
                } else {
                    Ok(0.91_f64)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 0.91);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_fails_immediately() {
        let attempts = Arc::new(AtomicU32::new(0));
        let config = RetryConfig { max_retries: 3, immediate: true };

        let result = with_retry("test", &config, || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(XaiError::InvalidOutput("not json".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_exhausts_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let config = RetryConfig { max_retries: 2, immediate: true };

        let result = with_retry("test", &config, || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(XaiError::Timeout("slow".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(XaiError::Timeout(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
