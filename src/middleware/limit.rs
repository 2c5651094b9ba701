//! # Concurrency-limiting decorator.
//!
//! Bounds the number of in-flight handler invocations across the whole process.
//! All handlers wrapped by one [`concurrency_limit`] middleware share a single
//! [`Semaphore`], regardless of how many consumers call them.
//!
//! ## Acquisition
//! ```text
//! slot free        ──► run inner, release on return
//! all slots busy   ──► wait (non-busy) ──► slot freed   ──► run inner
//!                                      └─► ctx cancelled ──► Err(Canceled), inner not called
//! ```

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::{BoxHandlerFuture, Handler, HandlerRef, Message};
use crate::middleware::{Middleware, from_fn};

/// Handler wrapper gated by a shared semaphore.
pub struct ConcurrencyLimit {
    inner: HandlerRef,
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimit {
    /// Wraps `inner`; invocations hold one permit of `semaphore` while running.
    pub fn new(inner: HandlerRef, semaphore: Arc<Semaphore>) -> Self {
        Self { inner, semaphore }
    }
}

/// Takes a free slot immediately, or waits for one unless `ctx` is cancelled first.
async fn acquire(
    semaphore: Arc<Semaphore>,
    ctx: &CancellationToken,
) -> Result<OwnedSemaphorePermit, HandlerError> {
    if let Ok(permit) = Arc::clone(&semaphore).try_acquire_owned() {
        return Ok(permit);
    }
    let permit_future = semaphore.acquire_owned();
    tokio::pin!(permit_future);

    tokio::select! {
        res = &mut permit_future => res.map_err(|_closed| HandlerError::Canceled),
        _ = ctx.cancelled() => Err(HandlerError::Canceled),
    }
}

impl Handler for ConcurrencyLimit {
    fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture {
        let inner = Arc::clone(&self.inner);
        let semaphore = Arc::clone(&self.semaphore);
        Box::pin(async move {
            let _permit = acquire(semaphore, &ctx).await?;
            inner.handle(ctx, msg).await
        })
    }
}

/// Returns a middleware allowing at most `max_in_flight` concurrent invocations.
///
/// `max_in_flight` is clamped to a minimum of 1.
pub fn concurrency_limit(max_in_flight: usize) -> Middleware {
    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));
    from_fn(move |inner| Arc::new(ConcurrencyLimit::new(inner, Arc::clone(&semaphore))))
}
