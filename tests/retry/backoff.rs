//! Delay schedule tests.

use scorable_core::ScorableError;
use scorable_retry::{
    ExponentialBackoff, FnInterval, IntervalFunction, Jitter, RetryManager, RetryPolicy,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn two_failures_then_success_waits_one_then_two_seconds() {
    let policy = RetryPolicy::builder()
        .max_retries(2)
        .base_delay(Duration::from_millis(1000))
        .max_delay(Duration::from_millis(10_000))
        .backoff_multiplier(2.0)
        .jitter(Jitter::None)
        .build();
    let manager = RetryManager::new(policy);

    let attempts = Arc::new(Mutex::new(Vec::new()));
    let start = Instant::now();

    let result = manager
        .execute(|| {
            let attempts = Arc::clone(&attempts);
            async move {
                let mut attempts = attempts.lock().unwrap();
                attempts.push(Instant::now());
                if attempts.len() < 3 {
                    Err(ScorableError::new(500, "server_error", None, None))
                } else {
                    Ok("scored")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "scored");

    let attempts = attempts.lock().unwrap();
    assert_eq!(attempts.len(), 3);
    assert_close(attempts[1] - attempts[0], Duration::from_millis(1000));
    assert_close(attempts[2] - attempts[1], Duration::from_millis(2000));
    assert!(start.elapsed() >= Duration::from_millis(3000));
}

#[test]
fn delays_are_capped_at_max_delay() {
    let backoff = ExponentialBackoff::new(Duration::from_millis(500))
        .multiplier(3.0)
        .max_delay(Duration::from_secs(4))
        .jitter(Jitter::None);

    let delays: Vec<_> = (0..5).map(|n| backoff.next_interval(n)).collect();
    assert_eq!(
        delays,
        vec![
            Duration::from_millis(500),
            Duration::from_millis(1500),
            Duration::from_millis(4000),
            Duration::from_millis(4000),
            Duration::from_millis(4000),
        ]
    );
}

#[test]
fn huge_attempt_numbers_saturate() {
    let policy = RetryPolicy::builder()
        .base_delay(Duration::from_secs(1))
        .max_delay(Duration::from_secs(30))
        .jitter(Jitter::None)
        .build();

    assert_eq!(policy.delay_for(10_000), Duration::from_secs(30));
}

#[test]
fn full_jitter_stays_within_computed_delay() {
    let policy = RetryPolicy::builder()
        .base_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(5))
        .jitter(Jitter::Full)
        .build();

    for attempt in 0..8 {
        let ceiling =
            Duration::from_millis(100 * 2u64.pow(attempt as u32)).min(Duration::from_secs(5));
        for _ in 0..50 {
            assert!(policy.delay_for(attempt) <= ceiling);
        }
    }
}

#[test]
fn equal_jitter_keeps_at_least_half() {
    let policy = RetryPolicy::builder()
        .base_delay(Duration::from_millis(800))
        .jitter(Jitter::Equal)
        .build();

    for _ in 0..100 {
        let delay = policy.delay_for(0);
        assert!(delay >= Duration::from_millis(400), "{:?}", delay);
        assert!(delay <= Duration::from_millis(800), "{:?}", delay);
    }
}

#[tokio::test(start_paused = true)]
async fn custom_schedule_drives_waits() {
    let policy = RetryPolicy::builder()
        .max_retries(3)
        .backoff(FnInterval::new(|attempt| Duration::from_millis(250 * (attempt as u64 + 1))))
        .build();
    let manager = RetryManager::new(policy);

    let start = Instant::now();
    let _ = manager
        .execute(|| async { Err::<(), _>(ScorableError::transport("NETWORK_ERROR", "reset")) })
        .await;

    // 250 + 500 + 750
    assert_close(start.elapsed(), Duration::from_millis(1500));
}

fn assert_close(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(5),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}
