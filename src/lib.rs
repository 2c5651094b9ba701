//! # queuevisor
//!
//! **Queuevisor** supervises a pool of message-queue consumers.
//!
//! It starts a configurable number of fetchers against a shared queue, runs every
//! message through one composed middleware chain, and drains the pool gracefully on
//! interrupt: fetching stops first, in-flight messages finish and are acknowledged,
//! and only then is the deletion scope released.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                    ┌──────────────────────────────┐
//!   OS signal ─────► │  Supervisor                  │
//!  (or future)       │  - Scopes { fetch, delete }  │
//!                    │  - compose(handler) once     │
//!                    └──────┬──────────┬──────────┬─┘
//!                           ▼          ▼          ▼
//!                    ┌──────────┐┌──────────┐┌──────────┐
//!                    │Consumer 0││Consumer 1││Consumer N│   (same fetch token)
//!                    └────┬─────┘└────┬─────┘└────┬─────┘
//!                         │ receive   │           │
//!                         ▼           ▼           ▼
//!                  ┌─────────────────────────────────────┐
//!                  │ QueueService (shared, concurrent)   │
//!                  └─────────────────────────────────────┘
//!                         │ handle(ctx, msg)
//!                         ▼
//!   concurrency_limit ─► track_metrics ─► delete_on_success ─► [timeout] ─► base handler
//!        (Semaphore)       (MetricsSink)     (delete scope)
//! ```
//!
//! ### Lifecycle
//! ```text
//! run(handler)
//!   ├─► observer waits for trigger ──► fetch.cancel()
//!   ├─► spawn N consumers
//!   │     loop {
//!   │       ├─► fetch cancelled?      ─► stop
//!   │       ├─► receive (cancellable) ─► None: loop / transient error: backoff
//!   │       │                          └► fatal error: stop with Err
//!   │       └─► handle(msg)           ─► failure logged, loop continues
//!   │     }
//!   ├─► join all N consumers  (optionally bounded by Config::grace)
//!   └─► delete.cancel()  ─► "shutdown complete"
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                         |
//! |-------------------|------------------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | Fan out consumers, drain on shutdown, aggregate outcomes.        | [`Supervisor`], [`Scopes`]                 |
//! | **Handlers**      | Cancellation-aware per-message processing.                       | [`Handler`], [`HandlerFn`], [`Message`]    |
//! | **Middleware**    | Ordered `Handler → Handler` decorators.                          | [`Middleware`], [`middleware::apply`]      |
//! | **Queues**        | Transport seam and an in-process implementation.                 | [`QueueService`], [`MemoryQueue`]          |
//! | **Metrics**       | Injected sink, periodic gauges, `/debug/vars` exposition.        | [`MetricsSink`], [`ExpvarRegistry`]        |
//! | **Policies**      | Backoff for transient receive errors.                            | [`BackoffPolicy`], [`JitterPolicy`]        |
//! | **Errors**        | Typed errors for runtime, handlers and queues.                   | [`RuntimeError`], [`HandlerError`], [`QueueError`] |
//! | **Configuration** | Centralized runtime settings.                                    | [`Config`]                                 |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use queuevisor::{Config, ExpvarRegistry, HandlerError, HandlerFn, MemoryQueue, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = Arc::new(MemoryQueue::new());
//!     queue.push("hello");
//!
//!     let cfg = Config { fetchers: 2, ..Config::default() };
//!     let sup = Supervisor::builder(cfg, queue)
//!         .with_metrics(Arc::new(ExpvarRegistry::new()))
//!         .build();
//!
//!     let handler = HandlerFn::arc(|ctx: CancellationToken, body: String| async move {
//!         if ctx.is_cancelled() {
//!             return Err(HandlerError::Canceled);
//!         }
//!         println!("MSG: '{body}'");
//!         Ok(())
//!     });
//!
//!     // Returns after Ctrl-C / SIGTERM once every consumer has drained.
//!     sup.run(handler).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod handlers;
pub mod metrics;
pub mod middleware;
mod policies;
mod queue;

// ---- Public re-exports ----

pub use crate::core::shutdown;
pub use crate::core::{Config, Consumer, Scopes, Supervisor, SupervisorBuilder};
pub use error::{HandlerError, QueueError, RuntimeError};
pub use handlers::{BoxHandlerFuture, Handler, HandlerFn, HandlerRef, Message};
pub use metrics::{ExpvarRegistry, MetricsRef, MetricsReporter, MetricsSink};
pub use middleware::Middleware;
pub use policies::{BackoffPolicy, JitterPolicy};
pub use queue::{MemoryQueue, QueueRef, QueueService};
