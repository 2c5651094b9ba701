//! Retry policies for queue receive failures.
//!
//! When a [`QueueService`](crate::QueueService) reports a transient receive error,
//! the consumer does not stop: it waits and tries again. These knobs decide how long.
//!
//! ## Contents
//! - [`BackoffPolicy`] delay after `n` consecutive failures (first / factor / max)
//! - [`JitterPolicy`]  keeps fetchers of one queue from retrying in lockstep
//!
//! ## Quick wiring
//! ```text
//! Config { receive_backoff: BackoffPolicy, .. }
//!      └─► core::consumer::Consumer uses:
//!           - receive_backoff.delay(consecutive_failures) after a transient receive error
//!           - a fatal (Unreachable) error skips backoff and stops the consumer
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=100ms, factor=2.0, max=10s, jitter=Equal.
//! - Several fetchers usually share one queue, so jitter is on by default.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
