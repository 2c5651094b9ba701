use crate::core::{Config, Supervisor};
use crate::metrics::MetricsRef;
use crate::middleware::Middleware;
use crate::queue::QueueRef;

/// Builder for constructing a [`Supervisor`] with optional features.
pub struct SupervisorBuilder {
    cfg: Config,
    queue: QueueRef,
    metrics: Option<MetricsRef>,
    middleware: Vec<Middleware>,
}

impl SupervisorBuilder {
    /// Creates a new builder for `queue` with the given configuration.
    pub fn new(cfg: Config, queue: QueueRef) -> Self {
        Self {
            cfg,
            queue,
            metrics: None,
            middleware: Vec::new(),
        }
    }

    /// Enables the metrics-tracking layer, reporting to `sink`.
    ///
    /// Metric names are derived from [`Config::queue_name`].
    pub fn with_metrics(mut self, sink: MetricsRef) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Appends an embedder middleware.
    ///
    /// Embedder middleware sits innermost, directly around the base handler, in
    /// the order added.
    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Builds the supervisor. Scopes are created here, uncancelled.
    pub fn build(self) -> Supervisor {
        Supervisor::new_internal(self.cfg, self.queue, self.metrics, self.middleware)
    }
}
