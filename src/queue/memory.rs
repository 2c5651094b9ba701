//! # In-process queue.
//!
//! [`MemoryQueue`] keeps messages in memory and mimics a long-polling queue:
//!
//! ```text
//! push(body) ──► ready (FIFO) ──receive()──► in_flight{receipt} ──delete()──► deleted
//!                                                   │
//!                                                   └─ never deleted: stays in flight
//! ```
//!
//! ## Rules
//! - `receive` waits up to `wait_time` for a message, then returns `Ok(None)`.
//! - `receive` returns `Ok(None)` as soon as its context is cancelled.
//! - `delete` fails with [`QueueError::Canceled`] once its context is cancelled.
//! - After [`MemoryQueue::close`], `receive` fails with [`QueueError::Unreachable`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;
use crate::handlers::Message;
use crate::queue::QueueService;

#[derive(Default)]
struct State {
    ready: VecDeque<Message>,
    in_flight: HashMap<String, Message>,
    deleted: Vec<Message>,
    next_id: u64,
    closed: bool,
}

/// Long-polling in-memory queue.
pub struct MemoryQueue {
    state: Mutex<State>,
    notify: Notify,
    wait_time: Duration,
}

impl MemoryQueue {
    /// Default long-poll window.
    pub const DEFAULT_WAIT_TIME: Duration = Duration::from_secs(20);

    /// Creates an empty queue with the default 20s poll window.
    pub fn new() -> Self {
        Self::with_wait_time(Self::DEFAULT_WAIT_TIME)
    }

    /// Creates an empty queue with a custom poll window.
    pub fn with_wait_time(wait_time: Duration) -> Self {
        Self {
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            wait_time,
        }
    }

    /// Enqueues a message body and returns its id.
    pub fn push(&self, body: impl Into<String>) -> String {
        let id = {
            let mut st = self.lock();
            st.next_id += 1;
            let id = format!("msg-{}", st.next_id);
            st.ready.push_back(Message::new(id.clone(), String::new(), body));
            id
        };
        self.notify.notify_one();
        id
    }

    /// Marks the queue unreachable; every later `receive` fails fatally.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    /// Number of messages waiting to be received.
    pub fn pending(&self) -> usize {
        self.lock().ready.len()
    }

    /// Bodies of messages received but not deleted.
    pub fn in_flight(&self) -> Vec<String> {
        let mut bodies: Vec<String> = self
            .lock()
            .in_flight
            .values()
            .map(|m| m.body().to_string())
            .collect();
        bodies.sort_unstable();
        bodies
    }

    /// Bodies of deleted messages, in deletion order.
    pub fn deleted(&self) -> Vec<String> {
        self.lock()
            .deleted
            .iter()
            .map(|m| m.body().to_string())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves the next ready message in flight under a fresh receipt.
    fn take_next(&self) -> Result<Option<Message>, QueueError> {
        let mut st = self.lock();
        if st.closed {
            return Err(QueueError::Unreachable {
                error: "queue closed".to_string(),
            });
        }
        let Some(msg) = st.ready.pop_front() else {
            return Ok(None);
        };
        st.next_id += 1;
        let receipt = format!("rcpt-{}", st.next_id);
        let id = msg.id().to_string();
        let delivered = Message::new(id, receipt.clone(), msg.into_body());
        st.in_flight.insert(receipt, delivered.clone());
        Ok(Some(delivered))
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueService for MemoryQueue {
    async fn receive(&self, ctx: &CancellationToken) -> Result<Option<Message>, QueueError> {
        let deadline = tokio::time::sleep(self.wait_time);
        tokio::pin!(deadline);

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(msg) = self.take_next()? {
                return Ok(Some(msg));
            }

            tokio::select! {
                _ = ctx.cancelled() => return Ok(None),
                _ = &mut deadline => return Ok(None),
                _ = &mut notified => {}
            }
        }
    }

    async fn delete(&self, ctx: &CancellationToken, msg: &Message) -> Result<(), QueueError> {
        if ctx.is_cancelled() {
            return Err(QueueError::Canceled);
        }
        let mut st = self.lock();
        match st.in_flight.remove(msg.receipt()) {
            Some(m) => {
                st.deleted.push(m);
                Ok(())
            }
            None => Err(QueueError::Transient {
                error: format!("unknown receipt {:?}", msg.receipt()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn receive_returns_messages_in_order() {
        let q = MemoryQueue::with_wait_time(Duration::from_millis(10));
        q.push("a");
        q.push("b");
        let ctx = CancellationToken::new();

        let first = q.receive(&ctx).await.unwrap().unwrap();
        let second = q.receive(&ctx).await.unwrap().unwrap();
        assert_eq!(first.body(), "a");
        assert_eq!(second.body(), "b");
        assert_ne!(first.receipt(), second.receipt());
        assert_eq!(q.in_flight(), vec!["a", "b"]);
        assert!(q.receive(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn receive_wakes_on_push() {
        let q = Arc::new(MemoryQueue::with_wait_time(Duration::from_secs(30)));
        let ctx = CancellationToken::new();
        let rx = {
            let q = Arc::clone(&q);
            let ctx = ctx.clone();
            tokio::spawn(async move { q.receive(&ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        q.push("late");

        let got = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("receive should wake up")
            .unwrap()
            .unwrap();
        assert_eq!(got.unwrap().body(), "late");
    }

    #[tokio::test]
    async fn receive_returns_promptly_on_cancel() {
        let q = MemoryQueue::with_wait_time(Duration::from_secs(30));
        let ctx = CancellationToken::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let got = q.receive(&ctx).await.unwrap();
        assert!(got.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn delete_acknowledges_by_receipt() {
        let q = MemoryQueue::with_wait_time(Duration::from_millis(10));
        q.push("a");
        let ctx = CancellationToken::new();
        let msg = q.receive(&ctx).await.unwrap().unwrap();

        q.delete(&ctx, &msg).await.unwrap();
        assert_eq!(q.deleted(), vec!["a"]);
        assert!(q.in_flight().is_empty());

        let again = q.delete(&ctx, &msg).await.unwrap_err();
        assert_eq!(again.as_label(), "queue_transient");
    }

    #[tokio::test]
    async fn delete_refused_after_cancel() {
        let q = MemoryQueue::with_wait_time(Duration::from_millis(10));
        q.push("a");
        let msg = q.receive(&CancellationToken::new()).await.unwrap().unwrap();

        let ctx = CancellationToken::new();
        ctx.cancel();
        assert!(matches!(
            q.delete(&ctx, &msg).await,
            Err(QueueError::Canceled)
        ));
        assert_eq!(q.in_flight(), vec!["a"]);
    }

    #[tokio::test]
    async fn closed_queue_is_unreachable() {
        let q = MemoryQueue::with_wait_time(Duration::from_millis(10));
        q.push("a");
        q.close();
        let err = q.receive(&CancellationToken::new()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(q.pending(), 1);
    }
}
