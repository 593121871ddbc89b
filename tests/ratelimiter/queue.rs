//! Queue strategy tests.

use super::limiter;
use scorable_core::ErrorKind;
use scorable_ratelimiter::{RateLimitPolicy, RateLimiter, Strategy};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn queued_callers_are_served_in_arrival_order() {
    let limiter = limiter(1, Duration::from_secs(1), Strategy::Queue);
    let order = Arc::new(Mutex::new(Vec::new()));
    limiter.acquire().await.unwrap();

    let mut handles = Vec::new();
    for label in ["A", "B", "C"] {
        let limiter = limiter.clone();
        let order = Arc::clone(&order);
        handles.push(tokio::spawn(async move {
            limiter.acquire().await.unwrap();
            order.lock().unwrap().push(label);
        }));
        tokio::task::yield_now().await;
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
}

#[tokio::test(start_paused = true)]
async fn queued_callers_are_spaced_by_the_window() {
    let limiter = limiter(1, Duration::from_secs(2), Strategy::Queue);
    let start = Instant::now();
    limiter.acquire().await.unwrap();

    let waits: Vec<_> = futures::future::join_all((0..3).map(|_| {
        let limiter = limiter.clone();
        async move { limiter.acquire().await.unwrap() }
    }))
    .await;

    assert_eq!(
        waits,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(6),
        ]
    );
    assert_eq!(start.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn full_queue_rejects_with_queue_full() {
    let limiter = RateLimiter::new(
        RateLimitPolicy::builder()
            .max_requests(1)
            .window(Duration::from_secs(30))
            .strategy(Strategy::Queue)
            .max_queue_size(1)
            .build(),
    );
    limiter.acquire().await.unwrap();

    let waiter = tokio::spawn({
        let limiter = limiter.clone();
        async move { limiter.acquire().await }
    });
    tokio::task::yield_now().await;

    let err = limiter.acquire().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueueFull);
    assert_eq!(err.status(), 429);

    assert_eq!(waiter.await.unwrap().unwrap(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn dropped_waiter_leaves_the_queue() {
    let limiter = limiter(1, Duration::from_secs(10), Strategy::Queue);
    limiter.acquire().await.unwrap();

    let abandoned = tokio::spawn({
        let limiter = limiter.clone();
        async move { limiter.acquire().await }
    });
    tokio::task::yield_now().await;
    assert_eq!(limiter.status().queue_size, 1);

    abandoned.abort();
    let _ = abandoned.await;
    assert_eq!(limiter.status().queue_size, 0);

    // The next caller takes the head position and the freed slot.
    let waited = limiter.acquire().await.unwrap();
    assert_eq!(waited, Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn new_arrivals_do_not_overtake_the_queue() {
    let limiter = limiter(2, Duration::from_secs(10), Strategy::Queue);
    let order = Arc::new(Mutex::new(Vec::new()));
    limiter.acquire().await.unwrap();
    limiter.acquire().await.unwrap();

    let queued = tokio::spawn({
        let limiter = limiter.clone();
        let order = Arc::clone(&order);
        async move {
            limiter.acquire().await.unwrap();
            order.lock().unwrap().push("queued");
        }
    });
    tokio::task::yield_now().await;

    tokio::time::advance(Duration::from_secs(10)).await;
    limiter.acquire().await.unwrap();
    order.lock().unwrap().push("late");

    queued.await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["queued", "late"]);
}
