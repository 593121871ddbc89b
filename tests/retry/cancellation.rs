//! Cancellation tests.

use scorable_core::{ErrorKind, ScorableError};
use scorable_retry::{Jitter, RetryManager, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

fn slow_policy() -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(5)
        .base_delay(Duration::from_secs(2))
        .jitter(Jitter::None)
        .build()
}

#[tokio::test(start_paused = true)]
async fn cancel_during_backoff_returns_immediately() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&cancelled);
    let manager = RetryManager::builder()
        .policy(slow_policy())
        .on_cancelled(move |attempts| {
            c.store(attempts, Ordering::SeqCst);
        })
        .build();

    let calls = AtomicUsize::new(0);
    let start = Instant::now();

    let err = manager
        .execute_with_cancel(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ScorableError::new(503, "unavailable", None, None))
            },
            tokio::time::sleep(Duration::from_secs(3)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(err.status(), 499);
    // First wait (2s) finished, second (4s) abandoned at t=3s.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(cancelled.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_attempt_abandons_it() {
    let manager = RetryManager::new(slow_policy());
    let (stop, stopped) = oneshot::channel::<()>();

    let call = manager.execute_with_cancel(
        || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ScorableError>("too late")
        },
        async move {
            let _ = stopped.await;
        },
    );

    let canceller = async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let _ = stop.send(());
    };

    let (result, ()) = tokio::join!(call, canceller);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn uncancelled_call_completes_normally() {
    let manager = RetryManager::new(slow_policy());

    let value = manager
        .execute_with_cancel(
            || async { Ok::<_, ScorableError>(7) },
            futures::future::pending::<()>(),
        )
        .await
        .unwrap();

    assert_eq!(value, 7);
}
