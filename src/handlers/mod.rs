//! # Handler abstractions and the message type they process.
//!
//! This module provides the per-message processing contract:
//! - [`Message`] - a message received from a queue (id, receipt, body)
//! - [`Handler`] - trait for cancellation-aware message processing
//! - [`HandlerFn`] - closure-backed handler that only sees the message body
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler>`)

mod handler;
mod handler_fn;
mod message;

pub use handler::{BoxHandlerFuture, Handler, HandlerRef};
pub use handler_fn::HandlerFn;
pub use message::Message;
