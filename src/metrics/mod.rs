//! # Runtime metrics.
//!
//! Metrics flow through an injected [`MetricsSink`] instead of a process-global
//! registry, so emission can be tested without a live endpoint.
//!
//! ## Architecture
//! ```text
//! track_metrics middleware ──┐
//!                            ├──► MetricsSink ──(ExpvarRegistry)──► GET /debug/vars
//! MetricsReporter (tick) ────┘
//! ```
//!
//! ## Contents
//! - [`MetricsSink`] the emission seam (gauges, counters, timers)
//! - [`ExpvarRegistry`] in-memory sink rendering an expvar-style JSON object
//! - [`MetricsReporter`] periodic process gauges (`total_tasks`, `process_uptime_seconds`)
//! - [`http`] axum router exposing a registry

pub mod http;
mod registry;
mod reporter;

use std::sync::Arc;
use std::time::Duration;

pub use registry::{ExpvarRegistry, TimerStats};
pub use reporter::MetricsReporter;

/// Shared handle to a metrics sink.
pub type MetricsRef = Arc<dyn MetricsSink>;

/// Destination for runtime metrics.
///
/// Implementations must be cheap and non-blocking: they are called on the
/// message hot path from many consumers at once.
pub trait MetricsSink: Send + Sync + 'static {
    /// Sets a gauge; each call overwrites the previous value.
    fn set_gauge(&self, name: &str, value: f64);

    /// Adds `delta` to a monotonically increasing counter.
    fn incr_counter(&self, name: &str, delta: u64);

    /// Records one duration sample.
    fn observe_duration(&self, name: &str, elapsed: Duration);
}
