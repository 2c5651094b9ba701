//! # Periodic process gauges.
//!
//! [`MetricsReporter`] samples process-wide values on a fixed tick and writes them
//! to a [`MetricsSink`]:
//! - `total_tasks`: tasks alive on the current tokio runtime;
//! - `process_uptime_seconds`: seconds since the reporter was created.
//!
//! It runs as a detached background task with no shutdown coordination; the
//! returned [`JoinHandle`] may be aborted by the embedder.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::metrics::MetricsRef;

/// Samples process gauges into a sink.
pub struct MetricsReporter {
    sink: MetricsRef,
    interval: Duration,
    started: Instant,
}

impl MetricsReporter {
    /// Gauge name for the number of alive runtime tasks.
    pub const TASKS_GAUGE: &'static str = "total_tasks";
    /// Gauge name for process uptime.
    pub const UPTIME_GAUGE: &'static str = "process_uptime_seconds";

    /// Creates a reporter; uptime is measured from this call.
    ///
    /// A zero `interval` is bumped to one millisecond.
    pub fn new(sink: MetricsRef, interval: Duration) -> Self {
        Self {
            sink,
            interval: interval.max(Duration::from_millis(1)),
            started: Instant::now(),
        }
    }

    /// Takes one sample. Must be called from within a tokio runtime.
    pub fn sample(&self) {
        let tasks = tokio::runtime::Handle::current()
            .metrics()
            .num_alive_tasks();
        self.sink.set_gauge(Self::TASKS_GAUGE, tasks as f64);
        self.sink
            .set_gauge(Self::UPTIME_GAUGE, self.started.elapsed().as_secs_f64());
    }

    /// Spawns the sampling loop on the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(self.interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                self.sample();
            }
        })
    }
}
