use rand::Rng;
use std::time::Duration;

/// Computes the delay before a retry.
///
/// `attempt` is 0-indexed: `next_interval(0)` is the wait between the initial
/// attempt and the first retry.
pub trait IntervalFunction: Send + Sync {
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// Randomization applied on top of the exponential delay `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Exactly `d`.
    None,
    /// Uniform in `[0, d]`.
    #[default]
    Full,
    /// Uniform in `[d / 2, d]`.
    Equal,
}

impl Jitter {
    fn apply(self, delay: Duration) -> Duration {
        let secs = delay.as_secs_f64();
        if secs == 0.0 {
            return delay;
        }

        let mut rng = rand::rng();
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_secs_f64(rng.random_range(0.0..=secs)),
            Jitter::Equal => {
                let half = secs / 2.0;
                Duration::from_secs_f64(half + rng.random_range(0.0..=half))
            }
        }
        .min(delay)
    }
}

/// `min(max_delay, base_delay * multiplier^attempt)`, then jittered.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    jitter: Jitter,
}

impl ExponentialBackoff {
    /// Multiplier 2.0, capped at 30 seconds, full jitter.
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: Jitter::Full,
        }
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// The delay before jitter is applied.
    pub fn computed_delay(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);

        // Large attempt counts overflow to infinity well before the cap matters.
        if secs.is_nan() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else if secs <= 0.0 {
            // A negative multiplier yields negative delays on odd attempts.
            Duration::ZERO
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        self.jitter.apply(self.computed_delay(attempt))
    }
}

/// Backoff computed by a closure.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}
