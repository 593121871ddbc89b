//! Attempt counting and retry-condition tests.

use scorable_core::{ErrorKind, ScorableError};
use scorable_retry::{Jitter, RetryManager, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn policy(max_retries: usize) -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(20))
        .jitter(Jitter::None)
        .build()
}

async fn count_attempts(manager: &RetryManager, error: ScorableError) -> (usize, ScorableError) {
    let calls = AtomicUsize::new(0);
    let err = manager
        .execute(|| {
            let error = error.clone();
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(error)
            }
        })
        .await
        .unwrap_err();
    (calls.load(Ordering::SeqCst), err)
}

#[tokio::test(start_paused = true)]
async fn always_failing_operation_runs_max_retries_plus_one() {
    for max_retries in [0, 1, 2, 5] {
        let manager = RetryManager::new(policy(max_retries));
        let (calls, err) =
            count_attempts(&manager, ScorableError::new(502, "bad_gateway", None, None)).await;

        assert_eq!(calls, max_retries + 1);
        assert_eq!(err.status(), 502);
    }
}

#[tokio::test(start_paused = true)]
async fn transient_kinds_are_retried() {
    let transient = [
        ScorableError::new(500, "server_error", None, None),
        ScorableError::new(429, "rate_limited", None, None),
        ScorableError::new(418, "throttled", None, None),
        ScorableError::transport("NETWORK_ERROR", "connection reset"),
        ScorableError::throttled(None),
    ];

    for error in transient {
        let manager = RetryManager::new(policy(2));
        let (calls, _) = count_attempts(&manager, error.clone()).await;
        assert_eq!(calls, 3, "{:?} should be retried", error.kind());
    }
}

#[tokio::test]
async fn permanent_and_local_kinds_surface_immediately() {
    let permanent = [
        ScorableError::new(400, "invalid", None, None),
        ScorableError::new(422, "parse_error", None, None),
        ScorableError::new(401, "x", None, None),
        ScorableError::new(403, "not_authenticated", None, None),
        ScorableError::new(404, "not_found", None, None),
        ScorableError::new(409, "conflict", None, None),
        ScorableError::queue_full(10),
        ScorableError::cancelled(),
        ScorableError::timeout(Duration::from_secs(1)),
    ];

    for error in permanent {
        let manager = RetryManager::new(policy(3));
        let (calls, err) = count_attempts(&manager, error.clone()).await;
        assert_eq!(calls, 1, "{:?} should not be retried", error.kind());
        assert_eq!(err, error);
    }
}

#[tokio::test(start_paused = true)]
async fn custom_condition_can_retry_not_found() {
    let policy = RetryPolicy::builder()
        .max_retries(2)
        .base_delay(Duration::from_millis(5))
        .retry_on(|error| error.is_not_found_error())
        .build();
    let manager = RetryManager::new(policy);

    let (calls, _) =
        count_attempts(&manager, ScorableError::new(404, "not_found", None, None)).await;
    assert_eq!(calls, 3);

    // The custom condition replaces the default one entirely.
    let (calls, _) =
        count_attempts(&manager, ScorableError::new(503, "unavailable", None, None)).await;
    assert_eq!(calls, 1);
}

#[tokio::test(start_paused = true)]
async fn final_error_is_the_last_one_seen() {
    let manager = RetryManager::new(policy(2));
    let calls = AtomicUsize::new(0);

    let err = manager
        .execute(|| async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ScorableError::new(500 + n as u16, "server_error", None, None))
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), 502);
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn results_are_never_inspected() {
    let manager = RetryManager::new(policy(3));
    let calls = AtomicUsize::new(0);

    // An `Ok` carrying a failure-looking payload is still a success.
    let value = manager
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ScorableError>(Err::<(), &str>("business failure"))
        })
        .await
        .unwrap();

    assert!(value.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn clones_share_policy_and_run_independently() {
    let manager = RetryManager::new(policy(1));
    let other = manager.clone();

    let (a, b) = tokio::join!(
        count_attempts(&manager, ScorableError::new(500, "x", None, None)),
        count_attempts(&other, ScorableError::new(500, "x", None, None)),
    );

    assert_eq!(a.0, 2);
    assert_eq!(b.0, 2);
}
