//! Rate limiter metrics regression tests

use super::helpers::*;
use scorable_ratelimiter::{RateLimitPolicy, RateLimiter, Strategy};
use serial_test::serial;
use std::time::Duration;

fn limiter(name: &str, max_queue_size: usize, strategy: Strategy) -> RateLimiter {
    RateLimiter::builder()
        .name(name)
        .policy(
            RateLimitPolicy::builder()
                .max_requests(1)
                .window(Duration::from_millis(50))
                .strategy(strategy)
                .max_queue_size(max_queue_size)
                .build(),
        )
        .build()
}

#[tokio::test]
#[serial]
async fn ratelimiter_metrics_exist() {
    init_recorder();

    let limiter = limiter("metrics_limiter", 10, Strategy::Queue);
    limiter.acquire().await.unwrap();
    limiter.acquire().await.unwrap();

    assert_counter_exists("ratelimiter_calls_total");
    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "metrics_limiter");
    assert_metric_has_label("ratelimiter_calls_total", "result", "acquired");

    assert_histogram_exists("ratelimiter_wait_duration_seconds");
    assert_metric_has_label(
        "ratelimiter_wait_duration_seconds",
        "ratelimiter",
        "metrics_limiter",
    );
}

#[tokio::test]
#[serial]
async fn ratelimiter_throttled_metrics() {
    init_recorder();

    let limiter = limiter("throttled_limiter", 10, Strategy::Reject);
    limiter.acquire().await.unwrap();
    let _ = limiter.acquire().await;

    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "throttled_limiter");
    assert_metric_has_label("ratelimiter_calls_total", "result", "throttled");
}

#[tokio::test]
#[serial]
async fn ratelimiter_queue_full_metrics() {
    init_recorder();

    let limiter = limiter("full_limiter", 0, Strategy::Queue);
    limiter.acquire().await.unwrap();
    let _ = limiter.acquire().await;

    assert_metric_has_label("ratelimiter_calls_total", "result", "queue_full");
}
