//! # Per-message timeout decorator.
//!
//! Runs the inner handler with a **child** token of the invocation context.
//! On expiry the handler's future is dropped where it stands, the child token is
//! cancelled and the invocation fails with [`HandlerError::Timeout`]. The handler
//! gets no chance to finish; only work it handed the token to (spawned tasks,
//! outgoing requests) observes the cancellation. Cancelling the child never
//! affects the parent fetch scope.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::{BoxHandlerFuture, Handler, HandlerRef, Message};
use crate::middleware::{Middleware, from_fn};

/// Handler wrapper enforcing a deadline per message.
pub struct Timeout {
    inner: HandlerRef,
    timeout: Duration,
}

impl Timeout {
    /// Wraps `inner` with a `timeout` deadline.
    pub fn new(inner: HandlerRef, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl Handler for Timeout {
    fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture {
        let inner = Arc::clone(&self.inner);
        let dur = self.timeout;
        Box::pin(async move {
            let child = ctx.child_token();
            match tokio::time::timeout(dur, inner.handle(child.clone(), msg)).await {
                Ok(res) => res,
                Err(_elapsed) => {
                    child.cancel();
                    Err(HandlerError::Timeout { timeout: dur })
                }
            }
        })
    }
}

/// Returns a middleware failing invocations that run longer than `dur`.
pub fn timeout(dur: Duration) -> Middleware {
    from_fn(move |inner| Arc::new(Timeout::new(inner, dur)))
}
