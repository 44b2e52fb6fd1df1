//! Optimistic-concurrency retry for get-modify-replace updates

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{debug, warn};

use super::client::is_conflict;

/// Backoff schedule for [`retry_on_conflict`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryBackoff {
    /// Maximum number of attempts
    pub steps: u32,
    /// Delay before the second attempt
    pub duration: Duration,
    /// Multiplier applied to the delay after each attempt
    pub factor: f64,
    /// Upper bound of the random extra delay, as a fraction of the base delay
    pub jitter: f64,
}

impl Default for RetryBackoff {
    /// 5 steps, 10ms apart, with 10% jitter
    fn default() -> Self {
        Self {
            steps: 5,
            duration: Duration::from_millis(10),
            factor: 1.0,
            jitter: 0.1,
        }
    }
}

impl RetryBackoff {
    /// Base delay after the given zero-based attempt, before jitter
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = if self.factor > 0.0 {
            self.factor.powi(attempt as i32)
        } else {
            1.0
        };
        self.duration.mul_f64(factor)
    }

    fn jittered(&self, attempt: u32) -> Duration {
        let base = self.delay(attempt);
        if self.jitter <= 0.0 {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0.0..=self.jitter);
        base + base.mul_f64(extra)
    }
}

/// True when the error is a `kube::Error` carrying a 409 Conflict
pub fn is_conflict_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<kube::Error>().is_some_and(is_conflict)
}

/// Run `op` until it succeeds, fails with something other than a conflict, or the
/// backoff runs out of steps.
///
/// `op` should fetch the latest object, modify it and replace it. Only a bare
/// `kube::Error` with status 409 is retried; anything else (including a failed
/// fetch wrapped in another error) is returned immediately. When every step
/// conflicts, the last conflict is returned.
pub async fn retry_on_conflict<T, F, Fut>(backoff: &RetryBackoff, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let steps = backoff.steps.max(1);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => {
                debug!(attempt = attempt + 1, "Update applied");
                return Ok(value);
            }
            Err(e) if is_conflict_error(&e) && attempt + 1 < steps => {
                let delay = backoff.jittered(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_attempts = steps,
                    delay_ms = delay.as_millis() as u64,
                    "Conflict updating object, retrying with latest version"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DemoError;
    use kube::error::ErrorResponse;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn kube_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("status {code}"),
            reason: "Test".to_string(),
            code,
        })
    }

    fn api_error(code: u16) -> anyhow::Error {
        kube_error(code).into()
    }

    fn fast_backoff(steps: u32) -> RetryBackoff {
        RetryBackoff {
            steps,
            duration: Duration::from_millis(1),
            factor: 1.0,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_default_backoff() {
        let backoff = RetryBackoff::default();
        assert_eq!(backoff.steps, 5);
        assert_eq!(backoff.duration, Duration::from_millis(10));
        assert_eq!(backoff.delay(3), Duration::from_millis(10));
    }

    #[test]
    fn test_delay_grows_with_factor() {
        let backoff = RetryBackoff {
            steps: 4,
            duration: Duration::from_millis(10),
            factor: 2.0,
            jitter: 0.0,
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(10));
        assert_eq!(backoff.delay(2), Duration::from_millis(40));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let backoff = RetryBackoff::default();
        for _ in 0..50 {
            let delay = backoff.jittered(0);
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_micros(11_001));
        }
    }

    #[test]
    fn test_conflict_detection() {
        assert!(is_conflict_error(&api_error(409)));
        assert!(!is_conflict_error(&api_error(404)));
        assert!(!is_conflict_error(&anyhow::anyhow!("409 conflict")));
    }

    #[tokio::test]
    async fn test_succeeds_after_conflicts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_on_conflict(&fast_backoff(5), || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(api_error(409))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_steps() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_on_conflict(&fast_backoff(3), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(api_error(409))
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(is_conflict_error(&err));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_on_conflict(&fast_backoff(5), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(api_error(500))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_aborts_even_on_conflict() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = retry_on_conflict(&fast_backoff(5), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DemoError::GetLatest {
                    kind: "Service",
                    source: kube_error(409),
                }
                .into())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(!is_conflict_error(&err));
        assert!(err
            .to_string()
            .starts_with("Failed to get latest version of Service"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_steps_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result = tokio_test::block_on(retry_on_conflict(&fast_backoff(0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>("done") }
        }));
        tokio_test::assert_ok!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
