//! Event listener and tower layer tests.

use scorable_core::{ErrorKind, ScorableError};
use scorable_retry::{Jitter, RetryLayer, RetryManager, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};

fn policy(max_retries: usize) -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(100))
        .jitter(Jitter::None)
        .build()
}

#[tokio::test(start_paused = true)]
async fn retry_events_carry_attempt_and_delay() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);

    let manager = RetryManager::builder()
        .name("judges")
        .policy(policy(3))
        .on_retry(move |attempt, delay| s.lock().unwrap().push((attempt, delay)))
        .build();

    let calls = AtomicUsize::new(0);
    let _ = manager
        .execute(|| async {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(ScorableError::transport("NETWORK_ERROR", "reset"))
            } else {
                Ok(())
            }
        })
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (1, Duration::from_millis(100)),
            (2, Duration::from_millis(200)),
            (3, Duration::from_millis(400)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn exhaustion_and_ignored_errors_are_reported() {
    let exhausted = Arc::new(AtomicUsize::new(0));
    let ignored = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&exhausted);
    let i = Arc::clone(&ignored);

    let manager = RetryManager::builder()
        .policy(policy(1))
        .on_error(move |attempts| {
            e.store(attempts, Ordering::SeqCst);
        })
        .on_ignored_error(move |kind| i.lock().unwrap().push(kind))
        .build();

    let _ = manager
        .execute(|| async { Err::<(), _>(ScorableError::new(500, "x", None, None)) })
        .await;
    let _ = manager
        .execute(|| async { Err::<(), _>(ScorableError::new(404, "x", None, None)) })
        .await;

    assert_eq!(exhausted.load(Ordering::SeqCst), 2);
    assert_eq!(*ignored.lock().unwrap(), vec![ErrorKind::NotFound]);
}

#[tokio::test]
async fn panicking_listener_does_not_break_the_call() {
    let after = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&after);

    let manager = RetryManager::builder()
        .on_success(|_| panic!("listener bug"))
        .on_success(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let value = manager
        .execute(|| async { Ok::<_, ScorableError>("ok") })
        .await
        .unwrap();

    assert_eq!(value, "ok");
    assert_eq!(after.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn layer_resends_cloned_requests() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&received);

    let inner = tower::service_fn(move |judge_id: String| {
        let r = Arc::clone(&r);
        async move {
            let mut received = r.lock().unwrap();
            received.push(judge_id.clone());
            if received.len() < 2 {
                Err(ScorableError::new(503, "unavailable", None, None))
            } else {
                Ok(format!("executed {}", judge_id))
            }
        }
    });

    let mut service = RetryLayer::new(RetryManager::new(policy(2))).layer(inner);
    let response = service
        .ready()
        .await
        .unwrap()
        .call("judge-7".to_string())
        .await
        .unwrap();

    assert_eq!(response, "executed judge-7");
    assert_eq!(*received.lock().unwrap(), vec!["judge-7", "judge-7"]);
}
