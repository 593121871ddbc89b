//! Property tests for the sliding-window rate limiter.
//!
//! Invariants tested:
//! - At most max_requests are admitted immediately in one window
//! - The request after that is rejected (Reject) or waits (Queue)
//! - requests_remaining drops by one per admission
//! - Admissions in any window never exceed max_requests

use super::paused_runtime;
use proptest::prelude::*;
use scorable_core::ErrorKind;
use scorable_ratelimiter::{RateLimitPolicy, RateLimiter, Strategy as Overflow};
use std::time::Duration;
use tokio::time::Instant;

fn limiter(max_requests: usize, window: Duration, strategy: Overflow) -> RateLimiter {
    RateLimiter::new(
        RateLimitPolicy::builder()
            .max_requests(max_requests)
            .window(window)
            .strategy(strategy)
            .max_queue_size(1_000)
            .build(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: the (max+1)-th request inside the window is rejected
    #[test]
    fn reject_admits_exactly_max_requests(max_requests in 1usize..=50) {
        let rt = paused_runtime();
        rt.block_on(async {
            let limiter = limiter(max_requests, Duration::from_secs(60), Overflow::Reject);

            for expected in (0..max_requests).rev() {
                prop_assert_eq!(limiter.acquire().await.unwrap(), Duration::ZERO);
                prop_assert_eq!(limiter.status().requests_remaining, expected);
            }

            let err = limiter.acquire().await.unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
            Ok(())
        })?;
    }

    /// Property: the (max+1)-th request waits until the oldest ages out
    #[test]
    fn queue_delays_the_overflow_request(
        max_requests in 1usize..=20,
        window_ms in 100u64..=10_000,
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let window = Duration::from_millis(window_ms);
            let limiter = limiter(max_requests, window, Overflow::Queue);

            for _ in 0..max_requests {
                prop_assert_eq!(limiter.acquire().await.unwrap(), Duration::ZERO);
            }

            prop_assert_eq!(limiter.acquire().await.unwrap(), window);
            Ok(())
        })?;
    }

    /// Property: no window ever sees more than max_requests admissions
    #[test]
    fn admissions_respect_the_window(
        max_requests in 1usize..=10,
        window_ms in 100u64..=2_000,
        gaps in prop::collection::vec(0u64..=500, 1..40),
    ) {
        let rt = paused_runtime();
        rt.block_on(async {
            let window = Duration::from_millis(window_ms);
            let limiter = limiter(max_requests, window, Overflow::Queue);
            let mut admitted = Vec::new();

            for gap in gaps {
                tokio::time::advance(Duration::from_millis(gap)).await;
                limiter.acquire().await.unwrap();
                admitted.push(Instant::now());
            }

            for (i, &at) in admitted.iter().enumerate() {
                let in_window = admitted[i..]
                    .iter()
                    .take_while(|&&later| later.duration_since(at) < window)
                    .count();
                prop_assert!(in_window <= max_requests);
            }
            Ok(())
        })?;
    }
}
