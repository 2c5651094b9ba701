//! # Handler middleware.
//!
//! A [`Middleware`] is a plain `Handler → Handler` transformation. A chain is an
//! ordered list folded right-to-left over the base handler, so the first entry is
//! the outermost wrapper:
//!
//! ```text
//! apply(base, [A, B, C])  ==  A(B(C(base)))
//!
//! call ──► A ──► B ──► C ──► base
//! result ◄── A ◄── B ◄── C ◄──┘
//! ```
//!
//! Composition happens once at startup; the resulting [`HandlerRef`] is shared by
//! every consumer and carries no per-consumer mutable state.
//!
//! ## Built-in decorators
//! - [`concurrency_limit`] bounds in-flight invocations process-wide
//! - [`track_metrics`] success/fail counters and a duration timer
//! - [`delete_on_success`] acknowledges the message after the inner handler succeeds
//! - [`timeout`] per-message deadline with cooperative cancellation
//!
//! [`default_stack`] returns the limiter and deletion layers in the order the
//! supervisor uses them.

mod delete;
mod limit;
mod timeout;
mod track;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::handlers::HandlerRef;
use crate::queue::QueueRef;

pub use delete::{DeleteOnSuccess, delete_on_success};
pub use limit::{ConcurrencyLimit, concurrency_limit};
pub use timeout::{Timeout, timeout};
pub use track::{MetricNames, TrackMetrics, track_metrics};

/// A `Handler → Handler` decorator.
pub type Middleware = Arc<dyn Fn(HandlerRef) -> HandlerRef + Send + Sync>;

/// Wraps a closure as a [`Middleware`].
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(HandlerRef) -> HandlerRef + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Applies `decorators` to `base`; the first decorator ends up outermost.
pub fn apply(base: HandlerRef, decorators: &[Middleware]) -> HandlerRef {
    decorators
        .iter()
        .rev()
        .fold(base, |inner, decorate| decorate(inner))
}

/// Returns the standard layers: a concurrency limiter (when `max_in_flight > 0`)
/// followed by delete-on-success bound to the delete scope.
pub fn default_stack(
    delete_ctx: CancellationToken,
    queue: QueueRef,
    max_in_flight: usize,
) -> Vec<Middleware> {
    let mut stack = Vec::with_capacity(2);
    if max_in_flight > 0 {
        stack.push(concurrency_limit(max_in_flight));
    }
    stack.push(delete_on_success(queue, delete_ctx));
    stack
}
