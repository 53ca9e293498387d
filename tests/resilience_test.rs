//! Resilience Integration Tests
//!
//! Retry-then-succeed and exhaustion scenarios through a real LogStore,
//! bounded attempts, early success and backoff properties.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use steady::logs::{LogFilter, LogLevel, LogStore};
use steady::resilience::{
    ExecutionResult, RecordingSleeper, ResilientExecutor, RetryError, RetryPolicy,
};

/// Simple test error for testing retry logic
#[derive(Debug, PartialEq)]
struct TestError(String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

fn executor(
    policy: RetryPolicy,
    store: &Arc<LogStore>,
    sleeper: &RecordingSleeper,
) -> ResilientExecutor {
    ResilientExecutor::new(policy)
        .unwrap()
        .with_sleeper(Arc::new(sleeper.clone()))
        .with_log(store.clone())
        .with_tag("scenario")
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_retry_then_succeed() {
    let store = Arc::new(LogStore::new());
    let sleeper = RecordingSleeper::new();
    let executor = executor(RetryPolicy::default(), &store, &sleeper);
    let attempts = Arc::new(AtomicU32::new(0));

    let result = executor
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError("transient".to_string()))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(store.query(LogFilter::level(LogLevel::Warn)).count(), 2);
    assert_eq!(store.query(LogFilter::level(LogLevel::Error)).count(), 0);
    let recovered = store.query(LogFilter::level(LogLevel::Info));
    assert_eq!(recovered.count(), 1);
    assert!(recovered
        .iter()
        .all(|e| e.message == "Succeeded on attempt 3/3"));
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
}

#[tokio::test]
async fn test_exhaustion_surfaces_last_error() {
    let store = Arc::new(LogStore::new());
    let sleeper = RecordingSleeper::new();
    let executor = executor(RetryPolicy::default(), &store, &sleeper);
    let attempts = Arc::new(AtomicU32::new(0));

    let result: ExecutionResult<(), TestError> = executor
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(TestError("boom".to_string()))
            }
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(err.attempts(), Some(3));
    assert_eq!(err.last_error(), Some(&TestError("boom".to_string())));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(store.query(LogFilter::level(LogLevel::Info)).is_empty());

    let errors = store.query(LogFilter::level(LogLevel::Error));
    assert_eq!(errors.count(), 1);
    let entry = errors.iter().next().unwrap();
    assert!(entry.message.contains("boom"));
    assert_eq!(entry.tag.as_deref(), Some("scenario"));
}

#[tokio::test]
async fn test_early_success_makes_one_call() {
    let store = Arc::new(LogStore::new());
    let sleeper = RecordingSleeper::new();
    let executor = executor(RetryPolicy::default().with_max_attempts(10), &store, &sleeper);
    let attempts = AtomicU32::new(0);

    let result: ExecutionResult<u32, TestError> = executor
        .execute(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(sleeper.delays().is_empty());
    assert!(store.query(LogFilter::level(LogLevel::Warn)).is_empty());
}

#[tokio::test]
async fn test_single_attempt_policy_never_sleeps() {
    let store = Arc::new(LogStore::new());
    let sleeper = RecordingSleeper::new();
    let executor = executor(RetryPolicy::once(), &store, &sleeper);

    let result: ExecutionResult<(), TestError> = executor
        .execute(|| async { Err(TestError("once".to_string())) })
        .await;

    assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
    assert!(sleeper.delays().is_empty());
    assert_eq!(
        result.unwrap_err().into_last_error(),
        Some(TestError("once".to_string()))
    );
}

#[tokio::test]
async fn test_delays_are_capped_by_max_delay() {
    let store = Arc::new(LogStore::new());
    let sleeper = RecordingSleeper::new();
    let policy = RetryPolicy::default().with_max_attempts(6);
    let executor = executor(policy, &store, &sleeper);

    let _: ExecutionResult<(), TestError> = executor
        .execute(|| async { Err(TestError("down".to_string())) })
        .await;

    let millis: Vec<u128> = sleeper.delays().iter().map(|d| d.as_millis()).collect();
    assert_eq!(millis, vec![100, 200, 400, 800, 1000]);
}

#[tokio::test]
async fn test_real_sleeper_waits_between_attempts() {
    let policy = RetryPolicy::default()
        .with_base_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(5));
    let executor = ResilientExecutor::new(policy).unwrap();
    let attempts = AtomicU32::new(0);
    let started = std::time::Instant::now();

    let _: ExecutionResult<(), TestError> = executor
        .execute(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError("slow".to_string())) }
        })
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() >= Duration::from_millis(10));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_delay_is_monotonic_and_bounded(
        base_ms in 0u64..5_000,
        extra_ms in 0u64..60_000,
        multiplier in 1.0f64..10.0,
        attempt in 1u32..200,
    ) {
        let policy = RetryPolicy::default()
            .with_max_attempts(attempt + 1)
            .with_base_delay(Duration::from_millis(base_ms))
            .with_max_delay(Duration::from_millis(base_ms + extra_ms))
            .with_backoff_multiplier(multiplier);

        let current = policy.delay(attempt).unwrap();
        let next = policy.delay(attempt + 1).unwrap();

        prop_assert!(current <= next);
        prop_assert!(next <= policy.max_delay);
        prop_assert!(policy.delay(1).unwrap() == policy.base_delay);
    }

    #[test]
    fn prop_attempts_never_exceed_max(max_attempts in 1u32..8, fail_first in 0u32..10) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let sleeper = RecordingSleeper::new();
        let executor = ResilientExecutor::new(RetryPolicy::default().with_max_attempts(max_attempts))
            .unwrap()
            .with_sleeper(Arc::new(sleeper.clone()));
        let calls = AtomicU32::new(0);

        let result: ExecutionResult<u32, TestError> = runtime.block_on(executor.execute(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < fail_first {
                    Err(TestError(format!("fail {}", n)))
                } else {
                    Ok(n)
                }
            }
        }));

        let calls = calls.load(Ordering::SeqCst);
        prop_assert!(calls <= max_attempts);
        prop_assert_eq!(sleeper.delays().len() as u32, calls - 1);
        prop_assert_eq!(result.is_ok(), fail_first < max_attempts);
    }
}
