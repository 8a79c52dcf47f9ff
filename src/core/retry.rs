//! Fixed-delay retry for fallible async operations.
//!
//! [`with_retry`] runs an operation up to [`RetryPolicy::max_tries`] times.
//! Errors accepted by the `retryable` predicate are logged and retried after
//! [`RetryPolicy::delay`]; any other error is returned at once. When every
//! attempt fails the result is `Ok(None)`, which callers treat as "nothing
//! happened".

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_TRIES: usize = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_tries: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_tries: usize, delay: Duration) -> Self {
        Self { max_tries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRIES, DEFAULT_DELAY)
    }
}

/// Predicate that retries on every error.
pub fn retry_all<E>(_: &E) -> bool {
    true
}

/// Run `operation` under `policy`.
///
/// Returns `Ok(Some(value))` on the first success, `Err(e)` as soon as an
/// error is rejected by `retryable`, and `Ok(None)` once all attempts failed.
pub async fn with_retry<T, E, F, Fut, P>(
    name: &str,
    policy: &RetryPolicy,
    retryable: P,
    mut operation: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    for attempt in 1..=policy.max_tries {
        tracing::info!("🔁 Trying to run {}, attempt {}/{}", name, attempt, policy.max_tries);

        match operation().await {
            Ok(value) => {
                tracing::info!("✅ Attempt {} succeeded for {}", attempt, name);
                return Ok(Some(value));
            }
            Err(e) if retryable(&e) => {
                if attempt < policy.max_tries {
                    tracing::info!(
                        error = %e,
                        "Attempt {} failed for {}. Sleeping for {:?}",
                        attempt,
                        name,
                        policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                } else {
                    tracing::info!(error = %e, "Attempt {} failed for {}", attempt, name);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "❌ {} failed with a non-retryable error", name);
                return Err(e);
            }
        }
    }

    tracing::error!("❌ All {} tries failed for {}", policy.max_tries, name);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn instant(max_tries: usize) -> RetryPolicy {
        RetryPolicy::new(max_tries, Duration::ZERO)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_tries, 5);
        assert_eq!(policy.delay, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_succeeds_after_k_failures() {
        let calls = &AtomicUsize::new(0);

        let result = with_retry("flaky", &instant(5), retry_all, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 3 {
                Err(TestError::Transient)
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result, Ok(Some(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_none() {
        let calls = &AtomicUsize::new(0);

        let result: Result<Option<u32>, TestError> =
            with_retry("always_failing", &instant(5), retry_all, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;

        assert_eq!(result, Ok(None));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_non_retryable_error_propagates_immediately() {
        let calls = &AtomicUsize::new(0);

        let result: Result<Option<u32>, TestError> = with_retry(
            "fatal",
            &instant(5),
            |e: &TestError| *e == TestError::Transient,
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            },
        )
        .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_success_runs_once() {
        let calls = &AtomicUsize::new(0);

        let result: Result<Option<&str>, TestError> =
            with_retry("steady", &instant(3), retry_all, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("done")
            })
            .await;

        assert_eq!(result, Ok(Some("done")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
