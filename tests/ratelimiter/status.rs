//! Status reporting tests.

use super::limiter;
use scorable_ratelimiter::Strategy;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn remaining_decreases_by_one_per_admission() {
    let limiter = limiter(5, Duration::from_secs(60), Strategy::Reject);

    for expected in (0..5).rev() {
        limiter.acquire().await.unwrap();
        assert_eq!(limiter.status().requests_remaining, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn reset_time_tracks_oldest_request() {
    let limiter = limiter(3, Duration::from_secs(60), Strategy::Reject);
    let start = Instant::now();

    limiter.acquire().await.unwrap();
    tokio::time::advance(Duration::from_secs(15)).await;
    limiter.acquire().await.unwrap();

    let status = limiter.status();
    assert_eq!(status.reset_time, start + Duration::from_secs(60));
    assert_eq!(status.reset_after, Duration::from_secs(45));

    tokio::time::advance(Duration::from_secs(45)).await;
    let status = limiter.status();
    assert_eq!(status.requests_remaining, 2);
    assert_eq!(status.reset_time, start + Duration::from_secs(75));
}

#[tokio::test(start_paused = true)]
async fn idle_limiter_reports_full_capacity() {
    let limiter = limiter(4, Duration::from_secs(60), Strategy::Queue);

    let status = limiter.status();
    assert_eq!(status.requests_remaining, 4);
    assert_eq!(status.reset_after, Duration::ZERO);
    assert_eq!(status.reset_time, Instant::now());
    assert_eq!(status.queue_size, 0);
}

#[tokio::test(start_paused = true)]
async fn status_counts_waiting_callers() {
    let limiter = limiter(1, Duration::from_secs(60), Strategy::Queue);
    limiter.acquire().await.unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await })
        })
        .collect();
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }

    assert_eq!(limiter.status().queue_size, 3);
    assert_eq!(limiter.status().requests_remaining, 0);

    for waiter in waiters {
        waiter.await.unwrap().unwrap();
    }
    assert_eq!(limiter.status().queue_size, 0);
}
