//! # Receive retry delays.
//!
//! After `n` consecutive failed receives a consumer sleeps for
//! `first × factor^(n-1)` (capped at `max`), randomized by [`JitterPolicy`].
//! The count resets on the first receive that succeeds or comes back empty.
//!
//! ```text
//! failures:  1      2      3      4     ...   8+
//! delay:     100ms  200ms  400ms  800ms ...   10s   (defaults, before jitter)
//! ```

use std::time::Duration;

use crate::policies::JitterPolicy;

/// Delay schedule for retrying a failed receive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Upper bound for any delay, before jitter.
    pub max: Duration,
    /// Growth per additional consecutive failure.
    pub factor: f64,
    /// Randomization applied to the capped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 2.0`, `max = 10s`, `jitter = Equal`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        }
    }
}

impl BackoffPolicy {
    /// Returns how long to wait after `failures` consecutive failed receives.
    ///
    /// `failures` is 1 for the first failure; 0 is treated the same way. Growth that
    /// overflows or turns negative (a `factor` below zero) falls back to `max`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use queuevisor::{BackoffPolicy, JitterPolicy};
    ///
    /// let policy = BackoffPolicy { jitter: JitterPolicy::None, ..BackoffPolicy::default() };
    /// assert_eq!(policy.delay(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay(3), Duration::from_millis(400));
    /// assert_eq!(policy.delay(30), Duration::from_secs(10));
    /// ```
    pub fn delay(&self, failures: u32) -> Duration {
        let exp = failures.saturating_sub(1).min(i32::MAX as u32) as i32;
        let grown = self.first.as_secs_f64() * self.factor.powi(exp);
        let capped = Duration::try_from_secs_f64(grown).map_or(self.max, |d| d.min(self.max));
        self.jitter.spread(capped)
    }
}
