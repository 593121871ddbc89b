//! Sliding-window admission tests.

use super::limiter;
use scorable_core::ErrorKind;
use scorable_ratelimiter::Strategy;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn window_slides_per_request_not_per_bucket() {
    let limiter = limiter(2, Duration::from_secs(10), Strategy::Reject);

    limiter.acquire().await.unwrap();
    tokio::time::advance(Duration::from_secs(6)).await;
    limiter.acquire().await.unwrap();

    // t=9s: both still inside the window.
    tokio::time::advance(Duration::from_secs(3)).await;
    assert!(limiter.acquire().await.is_err());

    // t=10s: the first request has aged out, the second has not.
    tokio::time::advance(Duration::from_secs(1)).await;
    limiter.acquire().await.unwrap();
    assert_eq!(limiter.status().requests_remaining, 0);

    // t=16s: the second request ages out.
    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(limiter.status().requests_remaining, 1);
}

#[tokio::test(start_paused = true)]
async fn reject_scenario_reports_remaining_window() {
    let limiter = limiter(2, Duration::from_secs(60), Strategy::Reject);

    limiter.acquire().await.unwrap();
    limiter.acquire().await.unwrap();
    let err = limiter.acquire().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
    assert_eq!(err.status(), 429);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
}

#[tokio::test(start_paused = true)]
async fn rejected_attempts_do_not_consume_slots() {
    let limiter = limiter(1, Duration::from_secs(5), Strategy::Reject);
    limiter.acquire().await.unwrap();

    for _ in 0..10 {
        assert!(limiter.acquire().await.is_err());
    }

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(limiter.acquire().await.unwrap(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failed_operations_still_consume_their_slot() {
    let limiter = limiter(1, Duration::from_secs(5), Strategy::Reject);

    let _ = limiter
        .execute(|| async {
            Err::<(), _>(scorable_core::ScorableError::new(500, "x", None, None))
        })
        .await;

    assert_eq!(limiter.status().requests_remaining, 0);
}

#[tokio::test(start_paused = true)]
async fn clones_share_one_window() {
    let limiter = limiter(2, Duration::from_secs(60), Strategy::Reject);
    let other = limiter.clone();

    limiter.acquire().await.unwrap();
    other.acquire().await.unwrap();

    assert!(limiter.acquire().await.is_err());
    assert!(other.acquire().await.is_err());
}
