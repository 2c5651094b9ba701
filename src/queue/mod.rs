//! # Queue service abstraction.
//!
//! [`QueueService`] is the transport seam: consumers receive from it, the
//! deletion middleware acknowledges through it. One instance is shared by
//! every consumer, so implementations must be safe for concurrent use.
//!
//! [`MemoryQueue`] is an in-process implementation for demos and tests.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;
use crate::handlers::Message;

pub use memory::MemoryQueue;

/// Shared handle to a queue service.
pub type QueueRef = Arc<dyn QueueService>;

/// Receive/delete operations against a message queue.
///
/// ### Contract
/// - `receive` long-polls for at most one message and returns `Ok(None)` when the
///   poll window elapses without one. It must return promptly once `ctx` is cancelled.
/// - `delete` acknowledges one delivery by its receipt. It runs under the delete
///   scope, which outlives the fetch scope during shutdown.
#[async_trait]
pub trait QueueService: Send + Sync + 'static {
    /// Waits for the next message, or `None` if the poll window elapsed.
    async fn receive(&self, ctx: &CancellationToken) -> Result<Option<Message>, QueueError>;

    /// Acknowledges a processed message so it is not delivered again.
    async fn delete(&self, ctx: &CancellationToken, msg: &Message) -> Result<(), QueueError>;
}
