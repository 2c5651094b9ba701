//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(CancellationToken, String) -> Fut`, producing a
//! fresh future per message. The closure only sees the message body; receipts and ids
//! stay with the middleware that needs them.
//!
//! ## Concurrency semantics
//! - Every call to [`Handler::handle`] creates a **new** future owning its own state.
//! - No hidden mutation between invocations; shared state goes through an explicit
//!   `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use queuevisor::{HandlerError, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef = HandlerFn::arc(|ctx: CancellationToken, body: String| async move {
//!     if ctx.is_cancelled() {
//!         return Err(HandlerError::Canceled);
//!     }
//!     println!("MSG: '{body}'");
//!     Ok(())
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::handler::{BoxHandlerFuture, Handler};
use crate::handlers::Message;

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per message.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc<Fut>(f: F) -> Arc<Self>
    where
        F: Fn(CancellationToken, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(CancellationToken, String) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture {
        Box::pin((self.f)(ctx, msg.into_body()))
    }
}
