//! Error types used by the queuevisor runtime, handlers and queue services.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`] - errors raised by the supervisor itself.
//! - [`HandlerError`] - per-message outcomes returned by handlers and middleware.
//! - [`QueueError`] - failures reported by a [`QueueService`](crate::QueueService).
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! ## Propagation
//! ```text
//! HandlerError ──► logged + counted by the Consumer, never leaves it
//! QueueError   ──► Transient: Consumer backs off and retries
//!              └─► Unreachable: Consumer stops, error reaches the Supervisor
//! RuntimeError ──► returned from Supervisor::run
//! ```

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the supervisor.
///
/// These aggregate consumer termination reasons and shutdown failures.
/// Per-message errors never show up here.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// One or more consumers terminated abnormally.
    #[error("{failed} of {total} consumers terminated with errors: {errors:?}")]
    ConsumersFailed {
        /// Number of consumers that reported a terminal error.
        failed: usize,
        /// Number of consumers that were started.
        total: usize,
        /// Rendered terminal errors, one per failed consumer.
        errors: Vec<String>,
    },

    /// Shutdown grace period was exceeded; stuck consumers were aborted.
    ///
    /// Consumers that had already failed are still reported through `errors`.
    #[error("shutdown timeout {grace:?} exceeded; {stuck} consumers aborted; earlier failures: {errors:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of consumers that did not stop in time.
        stuck: usize,
        /// Rendered terminal errors of consumers that failed before the abort.
        errors: Vec<String>,
    },

    /// `run` was called on a supervisor that has already been started.
    #[error("supervisor already started")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use queuevisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded {
    ///     grace: Duration::from_secs(5),
    ///     stuck: 2,
    ///     errors: vec![],
    /// };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ConsumersFailed { .. } => "runtime_consumers_failed",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::ConsumersFailed {
                failed,
                total,
                errors,
            } => format!("{failed}/{total} consumers failed; errors={errors:?}"),
            RuntimeError::GraceExceeded {
                grace,
                stuck,
                errors,
            } => format!("grace exceeded after {grace:?}; stuck consumers={stuck}; errors={errors:?}"),
            RuntimeError::AlreadyStarted => "supervisor already started".to_string(),
        }
    }
}

/// # Outcome of processing a single message.
///
/// Returned by [`Handler`](crate::Handler)s and by every middleware layer.
/// None of these stop the consumer loop; only fetch-scope cancellation does.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Processing failed; the message is left on the queue for redelivery.
    #[error("processing failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The invocation observed cancellation (while waiting for a slot or mid-handler).
    #[error("context cancelled")]
    Canceled,

    /// Processing exceeded the per-message timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Processing succeeded but the acknowledgement (delete) failed.
    ///
    /// The message may be delivered again: at-least-once, not data loss.
    #[error("delete failed: {error}")]
    DeleteFailed {
        /// The underlying error message.
        error: String,
    },
}

impl HandlerError {
    /// Convenience constructor for [`HandlerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use queuevisor::HandlerError;
    ///
    /// assert_eq!(HandlerError::fail("boom").as_label(), "handler_failed");
    /// assert_eq!(HandlerError::Canceled.as_label(), "handler_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Canceled => "handler_canceled",
            HandlerError::Timeout { .. } => "handler_timeout",
            HandlerError::DeleteFailed { .. } => "handler_delete_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Canceled => "context cancelled".to_string(),
            HandlerError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            HandlerError::DeleteFailed { error } => format!("delete failed: {error}"),
        }
    }

    /// Indicates whether this outcome is a cancellation rather than a processing error.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, HandlerError::Canceled)
    }
}

/// # Errors reported by a queue service.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum QueueError {
    /// Temporary failure; the caller may retry.
    #[error("transient queue error: {error}")]
    Transient {
        /// The underlying error message.
        error: String,
    },

    /// The queue became permanently unusable.
    #[error("queue unreachable: {error}")]
    Unreachable {
        /// The underlying error message.
        error: String,
    },

    /// The operation's context was cancelled before it could complete.
    #[error("queue operation cancelled")]
    Canceled,
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use queuevisor::QueueError;
    ///
    /// let err = QueueError::Unreachable { error: "dns".into() };
    /// assert_eq!(err.as_label(), "queue_unreachable");
    /// assert!(err.is_fatal());
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::Transient { .. } => "queue_transient",
            QueueError::Unreachable { .. } => "queue_unreachable",
            QueueError::Canceled => "queue_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            QueueError::Transient { error } => format!("transient: {error}"),
            QueueError::Unreachable { error } => format!("unreachable: {error}"),
            QueueError::Canceled => "cancelled".to_string(),
        }
    }

    /// Indicates whether the consumer that observed this error must stop.
    ///
    /// Returns `true` only for [`QueueError::Unreachable`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, QueueError::Unreachable { .. })
    }
}
