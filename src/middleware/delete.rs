//! # Delete-on-success decorator.
//!
//! Acknowledges a message only after the inner handler returned `Ok(())`.
//!
//! ```text
//! inner Ok  ──► queue.delete(delete_ctx, msg) ──► Ok            (acked)
//!                                             └─► DeleteFailed  (may be redelivered)
//! inner Err ──► returned unchanged, no delete  (queue redelivers after its own timeout)
//! ```
//!
//! The delete runs under the **delete** scope, not the invocation's fetch context,
//! so a message finished during shutdown is still acknowledged.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::{BoxHandlerFuture, Handler, HandlerRef, Message};
use crate::middleware::{Middleware, from_fn};
use crate::queue::QueueRef;

/// Handler wrapper that deletes successfully processed messages.
pub struct DeleteOnSuccess {
    inner: HandlerRef,
    queue: QueueRef,
    delete_ctx: CancellationToken,
}

impl DeleteOnSuccess {
    /// Wraps `inner`, deleting through `queue` under `delete_ctx`.
    pub fn new(inner: HandlerRef, queue: QueueRef, delete_ctx: CancellationToken) -> Self {
        Self {
            inner,
            queue,
            delete_ctx,
        }
    }
}

impl Handler for DeleteOnSuccess {
    fn handle(&self, ctx: CancellationToken, msg: Message) -> BoxHandlerFuture {
        let inner = Arc::clone(&self.inner);
        let queue = Arc::clone(&self.queue);
        let delete_ctx = self.delete_ctx.clone();
        Box::pin(async move {
            inner.handle(ctx, msg.clone()).await?;
            queue
                .delete(&delete_ctx, &msg)
                .await
                .map_err(|e| HandlerError::DeleteFailed {
                    error: e.to_string(),
                })
        })
    }
}

/// Returns a middleware that deletes messages after successful processing.
pub fn delete_on_success(queue: QueueRef, delete_ctx: CancellationToken) -> Middleware {
    from_fn(move |inner| {
        Arc::new(DeleteOnSuccess::new(
            inner,
            Arc::clone(&queue),
            delete_ctx.clone(),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::handlers::HandlerFn;
    use crate::queue::QueueService;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every delete together with the state of its context.
    #[derive(Default)]
    struct StubQueue {
        deletes: Mutex<Vec<(String, bool)>>,
        fail_deletes: bool,
    }

    #[async_trait]
    impl QueueService for StubQueue {
        async fn receive(&self, _ctx: &CancellationToken) -> Result<Option<Message>, QueueError> {
            Ok(None)
        }

        async fn delete(&self, ctx: &CancellationToken, msg: &Message) -> Result<(), QueueError> {
            self.deletes
                .lock()
                .unwrap()
                .push((msg.receipt().to_string(), ctx.is_cancelled()));
            if self.fail_deletes {
                return Err(QueueError::Transient {
                    error: "throttled".into(),
                });
            }
            Ok(())
        }
    }

    fn outcome_handler() -> HandlerRef {
        HandlerFn::arc(|_ctx: CancellationToken, body: String| async move {
            match body.as_str() {
                "ok" => Ok(()),
                "cancel" => Err(HandlerError::Canceled),
                "slow" => Err(HandlerError::Timeout {
                    timeout: std::time::Duration::from_millis(1),
                }),
                _ => Err(HandlerError::fail("bad")),
            }
        })
    }

    #[tokio::test]
    async fn deletes_after_success_with_delete_scope() {
        let queue = Arc::new(StubQueue::default());
        let delete_ctx = CancellationToken::new();
        let h = delete_on_success(queue.clone(), delete_ctx)(outcome_handler());

        let fetch = CancellationToken::new();
        fetch.cancel();
        h.handle(fetch, Message::new("1", "r-1", "ok")).await.unwrap();

        assert_eq!(
            *queue.deletes.lock().unwrap(),
            vec![("r-1".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn never_deletes_on_handler_error() {
        let queue = Arc::new(StubQueue::default());
        let h = delete_on_success(queue.clone(), CancellationToken::new())(outcome_handler());

        for body in ["bad", "cancel", "slow"] {
            let res = h
                .handle(CancellationToken::new(), Message::new("1", "r-1", body))
                .await;
            assert!(res.is_err(), "{body} should fail");
        }
        assert!(queue.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_fails_the_invocation() {
        let queue = Arc::new(StubQueue {
            fail_deletes: true,
            ..StubQueue::default()
        });
        let h = delete_on_success(queue.clone(), CancellationToken::new())(outcome_handler());

        let err = h
            .handle(CancellationToken::new(), Message::new("1", "r-1", "ok"))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "handler_delete_failed");
        assert_eq!(queue.deletes.lock().unwrap().len(), 1);
    }
}
