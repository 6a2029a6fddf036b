//! Exponential backoff policy.

use std::time::Duration;

use rand::Rng;

/// Upper bound on any single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Fraction of the base delay drawn as jitter.
const JITTER_FRACTION: f64 = 0.1;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Base delay before the first retry.
    pub initial_delay: Duration,
    /// Cap applied after jitter.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            ..Self::default()
        }
    }

    /// Total calls allowed, first attempt included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based) without jitter, in seconds.
    ///
    /// May exceed `max_delay`; callers cap it.
    fn base_secs(&self, retry: u32) -> f64 {
        if self.initial_delay.is_zero() {
            return 0.0;
        }
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.initial_delay.as_secs_f64() * 2f64.powi(exponent)
    }

    /// Delay before retry number `retry` without jitter, capped.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let cap = self.max_delay.as_secs_f64();
        Duration::from_secs_f64(self.base_secs(retry).min(cap))
    }

    /// Delay before retry number `retry` with uniform jitter in `[0, 0.1 * base)`.
    pub fn delay<R: Rng>(&self, retry: u32, rng: &mut R) -> Duration {
        let base = self.base_secs(retry);
        let cap = self.max_delay.as_secs_f64();
        if !base.is_finite() || base >= cap {
            return self.max_delay;
        }
        let jitter = rng.gen::<f64>() * JITTER_FRACTION * base;
        Duration::from_secs_f64((base + jitter).min(cap))
    }

    /// Wait before the next retry, honoring an upstream retry-after hint as a floor.
    pub fn next_delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let delay = self.delay(retry, &mut rand::thread_rng());
        match retry_after {
            Some(hint) => delay.max(hint).min(self.max_delay),
            None => delay,
        }
    }
}
