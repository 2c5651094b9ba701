//! # Spreading retry delays across fetchers.
//!
//! Every consumer of a pool shares one queue, so a queue hiccup fails all of their
//! receives at once. Without randomization they would also all retry at once.

use std::time::Duration;

use rand::Rng;

/// How a computed retry delay is randomized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// The delay is used as computed.
    #[default]
    None,

    /// The first half of the delay is always waited; the second half is drawn
    /// uniformly, so the result lies in `[delay / 2, delay]`.
    Equal,
}

impl JitterPolicy {
    /// Returns `delay` randomized according to this policy.
    ///
    /// ```
    /// use std::time::Duration;
    /// use queuevisor::JitterPolicy;
    ///
    /// let d = JitterPolicy::Equal.spread(Duration::from_millis(400));
    /// assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(400));
    /// ```
    pub fn spread(self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Equal => {
                let floor = delay / 2;
                let window = (delay - floor).as_nanos().min(u64::MAX as u128) as u64;
                floor + Duration::from_nanos(rand::rng().random_range(0..=window))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_keeps_delay() {
        let d = Duration::from_millis(750);
        assert_eq!(JitterPolicy::None.spread(d), d);
    }

    #[test]
    fn equal_stays_in_upper_half() {
        let d = Duration::from_millis(300);
        for _ in 0..200 {
            let got = JitterPolicy::Equal.spread(d);
            assert!(got >= Duration::from_millis(150), "{got:?} below half");
            assert!(got <= d, "{got:?} above delay");
        }
    }

    #[test]
    fn equal_on_zero_and_tiny_delays() {
        assert_eq!(JitterPolicy::Equal.spread(Duration::ZERO), Duration::ZERO);
        let one = Duration::from_nanos(1);
        assert!(JitterPolicy::Equal.spread(one) <= one);
    }

    #[test]
    fn equal_actually_varies() {
        let d = Duration::from_secs(1);
        let first = JitterPolicy::Equal.spread(d);
        assert!((0..50).any(|_| JitterPolicy::Equal.spread(d) != first));
    }
}
