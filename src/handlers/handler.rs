//! # Handler abstraction.
//!
//! A [`Handler`] processes one [`Message`] under a [`CancellationToken`]. The same
//! handler instance is shared by every consumer, so it must be safe for concurrent
//! invocation and hold no hidden mutable state.
//!
//! ## Cancellation contract
//! The runtime never preempts a handler. Long-running handlers are expected to poll
//! `ctx.is_cancelled()` (or await `ctx.cancelled()`) and return
//! [`HandlerError::Canceled`] promptly once the fetch scope is cancelled.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::Message;

/// Boxed future returned by [`Handler::handle`].
pub type BoxHandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

/// Shared handle to a handler, as passed between middleware layers and consumers.
pub type HandlerRef = Arc<dyn Handler>;

/// # Cancellation-aware message processor.
///
/// Each call produces a fresh `'static` future that owns its inputs; middleware
/// layers clone what they need into that future.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use queuevisor::{BoxHandlerFuture, Handler, HandlerError, Message};
///
/// struct Echo;
///
/// impl Handler for Echo {
///     fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(HandlerError::Canceled);
///             }
///             println!("{}", msg.body());
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Processes one message.
    ///
    /// Implementations should observe `ctx` and return [`HandlerError::Canceled`]
    /// when it fires during long work.
    fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture;
}
