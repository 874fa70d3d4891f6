//! Bounded exponential backoff around storage client calls.

use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    errors::{ScanError, ScanResult},
    services::client::ClientError,
};

/// Retry settings for backend requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Backoff multiplier (exponential backoff).
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetrySettings {
    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let delay = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = delay.min(self.max_backoff_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// Non-retryable errors become [`ScanError::Backend`] straight away. Retryable
/// ones that survive the budget become [`ScanError::BackendUnavailable`].
/// Cancellation is honoured while waiting between attempts.
pub async fn with_retry<T, F, Fut>(
    settings: &RetrySettings,
    scope: &str,
    cancel: &CancellationToken,
    mut op: F,
) -> ScanResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() {
            return Err(ScanError::Backend {
                container: scope.to_string(),
                source: err,
            });
        }
        if attempt >= max_attempts {
            warn!("{}: giving up after {} attempts: {}", scope, attempt, err);
            return Err(ScanError::BackendUnavailable {
                container: scope.to_string(),
                attempts: attempt,
                source: err,
            });
        }

        let delay = settings.backoff_for(attempt);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            scope, attempt, max_attempts, err, delay
        );
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ScanError::Cancelled { container: scope.to_string() });
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetrySettings {
        RetrySettings {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let settings = RetrySettings::default();
        assert_eq!(settings.backoff_for(1), Duration::from_millis(100));
        assert_eq!(settings.backoff_for(2), Duration::from_millis(200));
        assert_eq!(settings.backoff_for(3), Duration::from_millis(400));
        assert_eq!(settings.backoff_for(20), Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&fast(), "c", &CancellationToken::new(), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClientError::transient("reset"))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_backend_unavailable() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: ScanResult<()> =
            with_retry(&fast(), "c", &CancellationToken::new(), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Auth("token expired".into()))
            })
            .await;
        assert!(matches!(
            result,
            Err(ScanError::BackendUnavailable { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: ScanResult<()> =
            with_retry(&fast(), "c", &CancellationToken::new(), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::ContainerNotFound("c".into()))
            })
            .await;
        assert!(matches!(result, Err(ScanError::Backend { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_during_backoff() {
        let settings = RetrySettings {
            initial_backoff_ms: 60_000,
            max_backoff_ms: 60_000,
            ..fast()
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let result: ScanResult<()> = with_retry(&settings, "c", &cancel, || {
            trigger.cancel();
            async { Err(ClientError::transient("timeout")) }
        })
        .await;
        assert_eq!(
            result,
            Err(ScanError::Cancelled {
                container: "c".into()
            })
        );
    }
}
