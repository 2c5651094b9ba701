//! # Metrics-tracking decorator.
//!
//! Measures every invocation and reports to a [`MetricsSink`]:
//! - `<queue>.success` counter on `Ok(())`;
//! - `<queue>.fail` counter on any error (cancellation included);
//! - `<queue>.time` duration sample either way.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::handlers::{BoxHandlerFuture, Handler, HandlerRef, Message};
use crate::metrics::MetricsRef;
use crate::middleware::{Middleware, from_fn};

/// Metric names written by [`TrackMetrics`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricNames {
    /// Counter incremented on success.
    pub success: String,
    /// Counter incremented on failure.
    pub fail: String,
    /// Timer receiving invocation durations.
    pub time: String,
}

impl MetricNames {
    /// Names prefixed by `queue`: `<queue>.success`, `<queue>.fail`, `<queue>.time`.
    pub fn for_queue(queue: &str) -> Self {
        Self {
            success: format!("{queue}.success"),
            fail: format!("{queue}.fail"),
            time: format!("{queue}.time"),
        }
    }
}

/// Handler wrapper that counts outcomes and records durations.
pub struct TrackMetrics {
    inner: HandlerRef,
    sink: MetricsRef,
    names: Arc<MetricNames>,
}

impl TrackMetrics {
    /// Wraps `inner`, reporting to `sink` under `names`.
    pub fn new(inner: HandlerRef, sink: MetricsRef, names: Arc<MetricNames>) -> Self {
        Self { inner, sink, names }
    }
}

impl Handler for TrackMetrics {
    fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture {
        let inner = Arc::clone(&self.inner);
        let sink = Arc::clone(&self.sink);
        let names = Arc::clone(&self.names);
        Box::pin(async move {
            let started = Instant::now();
            let res = inner.handle(ctx, msg).await;
            match &res {
                Ok(()) => sink.incr_counter(&names.success, 1),
                Err(_) => sink.incr_counter(&names.fail, 1),
            }
            sink.observe_duration(&names.time, started.elapsed());
            res
        })
    }
}

/// Returns a middleware reporting outcomes to `sink` under `names`.
pub fn track_metrics(sink: MetricsRef, names: MetricNames) -> Middleware {
    let names = Arc::new(names);
    from_fn(move |inner| {
        Arc::new(TrackMetrics::new(
            inner,
            Arc::clone(&sink),
            Arc::clone(&names),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::HandlerFn;
    use crate::metrics::ExpvarRegistry;

    #[tokio::test]
    async fn counts_success_and_failure() {
        let reg = Arc::new(ExpvarRegistry::new());
        let base = HandlerFn::arc(|_ctx: CancellationToken, body: String| async move {
            if body == "bad" {
                Err(HandlerError::fail("bad message"))
            } else {
                Ok(())
            }
        });
        let h = track_metrics(reg.clone(), MetricNames::for_queue("push_gcm"))(base);

        for body in ["a", "bad", "b"] {
            let _ = h
                .handle(CancellationToken::new(), Message::new("1", "r", body))
                .await;
        }

        assert_eq!(reg.counter("push_gcm.success"), 2);
        assert_eq!(reg.counter("push_gcm.fail"), 1);
        assert_eq!(reg.timer("push_gcm.time").unwrap().count, 3);
    }

    #[test]
    fn names_are_prefixed_by_queue() {
        let names = MetricNames::for_queue("orders");
        assert_eq!(names.success, "orders.success");
        assert_eq!(names.fail, "orders.fail");
        assert_eq!(names.time, "orders.time");
    }
}
