//! Bounded retry with exponential backoff.
//!
//! [`retry_with_backoff`] wraps a fallible unit of work and re-runs it on
//! transient failures only.  For the evaluation pipeline the unit of work is
//! the *whole* two-stage sequence (transcription, then judgment): a failure
//! in the second stage re-attempts the first as well.  That re-transcribes
//! audio that already succeeded, which is the documented behavior of the
//! service this replaces.

use std::future::Future;
use std::time::Duration;

use super::client::EvalError;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Retry budget and backoff curve.
///
/// `delay = initial_delay × 2^attempt`, so the defaults wait 1000ms, 2000ms
/// and 4000ms between the four total attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt (3 retries = 4 total attempts).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay applied after the given zero-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt)
    }
}

// ---------------------------------------------------------------------------
// retry_with_backoff
// ---------------------------------------------------------------------------

/// Run `op` until it succeeds, fails permanently, or the retry budget is
/// exhausted.
///
/// Only [`EvalError::is_transient`] failures are retried; permanent
/// conditions (configuration, quota, schema) return immediately without
/// consuming retry budget.  After exhaustion the last transient error is
/// returned.
///
/// Each backoff delay is an await point; nothing is blocked while waiting.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, EvalError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EvalError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= policy.max_retries {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                attempt += 1;
                log::info!(
                    "retry attempt {attempt}/{} after {}ms: {err}",
                    policy.max_retries,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    /// Short delays so the backoff curve is observable without slow tests.
    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(10),
        }
    }

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    #[test]
    fn default_backoff_curve() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn success_on_first_attempt_runs_once() {
        let calls = counter();
        let calls_op = Arc::clone(&calls);

        let result = retry_with_backoff(&fast_policy(), move || {
            let calls = Arc::clone(&calls_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, EvalError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Transient failures on attempts 1–3 and success on attempt 4 yields
    /// the success after exactly 4 attempts, with the backoff delays
    /// actually elapsing in between.
    #[tokio::test]
    async fn transient_failures_then_success() {
        let calls = counter();
        let calls_op = Arc::clone(&calls);
        let started = Instant::now();

        let result = retry_with_backoff(&fast_policy(), move || {
            let calls = Arc::clone(&calls_op);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 3 {
                    Err(EvalError::Transient("service overloaded".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 10 + 20 + 40 ms of backoff must have elapsed.
        assert!(started.elapsed() >= Duration::from_millis(70));
    }

    /// A permanent condition fails immediately: exactly 1 attempt.
    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let calls = counter();
        let calls_op = Arc::clone(&calls);

        let result: Result<(), _> = retry_with_backoff(&fast_policy(), move || {
            let calls = Arc::clone(&calls_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EvalError::Configuration("API key missing".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(EvalError::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Quota errors share status codes with rate limits but never retry.
    #[tokio::test]
    async fn quota_error_is_not_retried() {
        let calls = counter();
        let calls_op = Arc::clone(&calls);

        let result: Result<(), _> = retry_with_backoff(&fast_policy(), move || {
            let calls = Arc::clone(&calls_op);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EvalError::QuotaExceeded("insufficient_quota".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(EvalError::QuotaExceeded(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Exhausted budget surfaces the last transient error after 4 attempts.
    #[tokio::test]
    async fn exhaustion_returns_last_transient_error() {
        let calls = counter();
        let calls_op = Arc::clone(&calls);

        let result: Result<(), _> = retry_with_backoff(&fast_policy(), move || {
            let calls = Arc::clone(&calls_op);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(EvalError::Transient(format!("failure {n}")))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(EvalError::Transient(detail)) => assert_eq!(detail, "failure 3"),
            other => panic!("expected transient error, got {other:?}"),
        }
    }

    /// A transient error turning permanent mid-sequence stops retrying.
    #[tokio::test]
    async fn permanent_error_mid_sequence_stops() {
        let calls = counter();
        let calls_op = Arc::clone(&calls);

        let result: Result<(), _> = retry_with_backoff(&fast_policy(), move || {
            let calls = Arc::clone(&calls_op);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(EvalError::Transient("busy".into()))
                } else {
                    Err(EvalError::Schema("missing field `score`".into()))
                }
            }
        })
        .await;

        assert!(matches!(result, Err(EvalError::Schema(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
