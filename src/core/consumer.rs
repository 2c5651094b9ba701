//! # Consumer: one receive → process loop.
//!
//! A [`Consumer`] binds a shared [`QueueService`](crate::QueueService) and the shared,
//! fully decorated [`Handler`](crate::Handler). It loops until the fetch scope is
//! cancelled or the queue becomes unusable.
//!
//! ## State machine
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//! Idle ──► Fetching ──Some(msg)──► Processing ──(any outcome)┘
//!  │          ├──None──────────────────────────────────► Idle
//!  │          ├──transient error or stray Canceled ──► backoff ──► Idle
//!  │          │
//!  │          └──fatal error──────────────────────────► Stopped(Err)
//!  └──fetch cancelled (checked before every receive)──► Stopped(Ok)
//! ```
//!
//! ## Rules
//! - `receive` is raced against fetch cancellation and returns promptly.
//! - A message being processed is never abandoned: the handler runs to completion
//!   and is expected to observe the token itself.
//! - A failing message never stops the loop; only cancellation or a fatal queue
//!   error does.

use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::error::{HandlerError, QueueError};
use crate::handlers::{HandlerRef, Message};
use crate::policies::BackoffPolicy;
use crate::queue::QueueRef;

/// A single fetcher bound to a queue and a handler.
pub struct Consumer {
    id: usize,
    queue: QueueRef,
    handler: HandlerRef,
    backoff: BackoffPolicy,
}

impl Consumer {
    /// Creates a consumer. `id` only labels log lines.
    pub fn new(id: usize, queue: QueueRef, handler: HandlerRef) -> Self {
        Self {
            id,
            queue,
            handler,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Overrides the delay policy used after transient receive errors.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Runs the loop until `fetch` is cancelled (`Ok`) or the queue fails fatally (`Err`).
    pub async fn run(self, fetch: CancellationToken) -> Result<(), QueueError> {
        tracing::debug!(fetcher = self.id, "consumer started");
        let mut failures: u32 = 0;

        loop {
            if fetch.is_cancelled() {
                break;
            }
            let received = select! {
                _ = fetch.cancelled() => break,
                res = self.queue.receive(&fetch) => res,
            };

            match received {
                Ok(Some(msg)) => {
                    failures = 0;
                    self.process(&fetch, msg).await;
                }
                Ok(None) => {
                    failures = 0;
                }
                Err(QueueError::Canceled) if fetch.is_cancelled() => break,
                Err(e) if e.is_fatal() => {
                    tracing::error!(fetcher = self.id, error = %e, "queue unusable; consumer stopping");
                    return Err(e);
                }
                // transient, or a cancellation the queue client raised on its own
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = self.backoff.delay(failures);
                    tracing::warn!(
                        fetcher = self.id,
                        error = %e,
                        delay = ?delay,
                        "receive failed; backing off"
                    );
                    select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = fetch.cancelled() => break,
                    }
                }
            }
        }

        tracing::debug!(fetcher = self.id, "consumer stopped");
        Ok(())
    }

    /// Runs the handler for one message and reports its outcome.
    async fn process(&self, fetch: &CancellationToken, msg: Message) {
        let id = msg.id().to_string();
        match self.handler.handle(fetch.clone(), msg).await {
            Ok(()) => {
                tracing::debug!(fetcher = self.id, message = %id, "message processed");
            }
            Err(HandlerError::Canceled) => {
                tracing::info!(fetcher = self.id, message = %id, "processing cancelled");
            }
            Err(e) => {
                tracing::warn!(
                    fetcher = self.id,
                    message = %id,
                    label = e.as_label(),
                    error = %e,
                    "message failed"
                );
            }
        }
    }
}
