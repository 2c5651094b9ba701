//! # Supervisor configuration.
//!
//! Provides [`Config`] centralized settings for the consumer pool.
//!
//! ## Sentinel values
//! - `max_in_flight = 0` → unlimited (no concurrency-limit layer)
//! - `handler_timeout = 0s` → no per-message timeout layer
//! - `grace = 0s` → wait for consumers indefinitely after shutdown is requested
//! - `fetchers = 0` → treated as 1

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Configuration for the supervisor, its middleware stack and metrics.
///
/// ## Field semantics
/// - `queue_name`: prefix of the tracking metrics (`<queue_name>.success|fail|time`)
/// - `fetchers`: number of concurrent consumers
/// - `max_in_flight`: process-wide bound on concurrent handler invocations
/// - `handler_timeout`: per-message deadline
/// - `grace`: maximum wait for consumers after the fetch scope is cancelled
/// - `receive_backoff`: delays between retries of failed receives
/// - `metrics_interval`: tick of the [`MetricsReporter`](crate::MetricsReporter)
/// - `metrics_addr`: bind address of the exposition endpoint
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Queue name used as the metrics prefix.
    pub queue_name: String,

    /// Number of consumers to start (min 1).
    pub fetchers: usize,

    /// Maximum number of handler invocations in flight across all consumers.
    ///
    /// - `0` = unlimited (no limiter layer)
    /// - `n > 0` = at most `n` invocations run simultaneously
    ///
    /// Each consumer handles one message at a time, so the limit only binds when
    /// it is below `fetchers`. With the defaults it is headroom, not a cap.
    pub max_in_flight: usize,

    /// Per-message timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = invocation fails with `HandlerError::Timeout` after this long
    pub handler_timeout: Duration,

    /// Shutdown grace period.
    ///
    /// - `Duration::ZERO` = wait until every consumer has returned
    /// - `> 0` = abort consumers still running after this long and return
    ///   `RuntimeError::GraceExceeded`
    pub grace: Duration,

    /// Backoff between retries after transient receive errors.
    pub receive_backoff: BackoffPolicy,

    /// Interval between process gauge samples.
    pub metrics_interval: Duration,

    /// Address of the metrics exposition endpoint.
    pub metrics_addr: SocketAddr,
}

impl Config {
    /// Returns the number of consumers to start, clamped to a minimum of 1.
    #[inline]
    pub fn fetchers_clamped(&self) -> usize {
        self.fetchers.max(1)
    }

    /// Returns the in-flight limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` concurrent invocations
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_in_flight == 0 {
            None
        } else {
            Some(self.max_in_flight)
        }
    }

    /// Returns the per-message timeout as an `Option`.
    #[inline]
    pub fn handler_timeout(&self) -> Option<Duration> {
        if self.handler_timeout == Duration::ZERO {
            None
        } else {
            Some(self.handler_timeout)
        }
    }

    /// Returns the shutdown grace period as an `Option` (`None` = unbounded).
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_name = "default"`
    /// - `fetchers = 1`
    /// - `max_in_flight = 3`
    /// - `handler_timeout = 0s` (none)
    /// - `grace = 0s` (unbounded wait)
    /// - `receive_backoff = BackoffPolicy::default()`
    /// - `metrics_interval = 5s`
    /// - `metrics_addr = 127.0.0.1:8123`
    fn default() -> Self {
        Self {
            queue_name: "default".to_string(),
            fetchers: 1,
            max_in_flight: 3,
            handler_timeout: Duration::ZERO,
            grace: Duration::ZERO,
            receive_backoff: BackoffPolicy::default(),
            metrics_interval: Duration::from_secs(5),
            metrics_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8123)),
        }
    }
}
