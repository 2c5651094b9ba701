//! # Queue message.

/// A message received from a [`QueueService`](crate::QueueService).
///
/// The `receipt` identifies this particular delivery and is what
/// [`QueueService::delete`](crate::QueueService::delete) acknowledges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    id: String,
    receipt: String,
    body: String,
}

impl Message {
    /// Creates a message from its parts.
    pub fn new(id: impl Into<String>, receipt: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            receipt: receipt.into(),
            body: body.into(),
        }
    }

    /// Queue-assigned message id (stable across redeliveries).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Delivery receipt used to acknowledge this delivery.
    pub fn receipt(&self) -> &str {
        &self.receipt
    }

    /// Message payload.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the message and returns its payload.
    pub fn into_body(self) -> String {
        self.body
    }
}
