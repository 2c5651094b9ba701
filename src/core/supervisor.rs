//! # Supervisor: runs the consumer pool and coordinates graceful shutdown.
//!
//! The [`Supervisor`] owns the two cancellation [`Scopes`], composes the handler
//! middleware once, fans out `fetchers` consumers and waits for every one of them
//! before releasing the delete scope.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   HandlerRef (embedder) ──► compose():
//!       [concurrency_limit, track_metrics, delete_on_success, timeout, ..extra] ─► base
//!
//! Spawn consumers (one JoinSet task each, same fetch token):
//!   Consumer[0]  Consumer[1]  ...  Consumer[N-1]
//!        │            │                  │
//!        └────────────┴──── receive ─► handle ─► (delete under delete scope)
//!
//! Shutdown path:
//!   trigger (OS signal / embedder future)
//!        └─► observer: fetch.cancel()             (delete scope untouched)
//!        └─► consumers finish current message, return
//!        └─► supervisor joins all N              (optionally bounded by cfg.grace)
//!        └─► delete.cancel()                      (strictly after the last join)
//! ```
//!
//! ## Outcome
//! - every consumer stopped cleanly → `Ok(())`
//! - any consumer returned a fatal queue error or panicked → `RuntimeError::ConsumersFailed`
//! - grace exceeded → `RuntimeError::GraceExceeded` (stuck consumers are aborted;
//!   failures of consumers that had already stopped are carried along)
//!
//! A failing consumer never stops the others.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};

use crate::core::{Config, Consumer, Scopes, SupervisorBuilder, shutdown};
use crate::error::{QueueError, RuntimeError};
use crate::handlers::HandlerRef;
use crate::metrics::MetricsRef;
use crate::middleware::{self, MetricNames, Middleware};
use crate::queue::QueueRef;

type Joined = (usize, Result<(), QueueError>);

/// Coordinates consumers, middleware composition and graceful shutdown.
///
/// A supervisor runs once: its scopes end the run cancelled, so any later
/// [`run`](Self::run) or [`run_until`](Self::run_until) call fails with
/// [`RuntimeError::AlreadyStarted`]. Build a new one to consume again.
pub struct Supervisor {
    cfg: Config,
    queue: QueueRef,
    scopes: Scopes,
    started: AtomicBool,
    metrics: Option<MetricsRef>,
    middleware: Vec<Middleware>,
}

impl Supervisor {
    /// Returns a builder for a supervisor consuming from `queue`.
    pub fn builder(cfg: Config, queue: QueueRef) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg, queue)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        queue: QueueRef,
        metrics: Option<MetricsRef>,
        middleware: Vec<Middleware>,
    ) -> Self {
        Self {
            cfg,
            queue,
            scopes: Scopes::new(),
            started: AtomicBool::new(false),
            metrics,
            middleware,
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The fetch and delete scopes driven by this supervisor.
    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Wraps `handler` in the configured middleware stack.
    ///
    /// Outermost first: concurrency limit, metrics tracking, delete-on-success,
    /// per-message timeout, then the embedder's own middleware.
    pub fn compose(&self, handler: HandlerRef) -> HandlerRef {
        let mut stack = middleware::default_stack(
            self.scopes.delete().clone(),
            Arc::clone(&self.queue),
            self.cfg.max_in_flight,
        );
        if let Some(sink) = &self.metrics {
            // directly outside deletion, so failed deletes are counted as failures
            let at = stack.len() - 1;
            stack.insert(
                at,
                middleware::track_metrics(
                    Arc::clone(sink),
                    MetricNames::for_queue(&self.cfg.queue_name),
                ),
            );
        }
        if let Some(dur) = self.cfg.handler_timeout() {
            stack.push(middleware::timeout(dur));
        }
        stack.extend(self.middleware.iter().cloned());
        middleware::apply(handler, &stack)
    }

    /// Runs the consumer pool until an OS termination signal drains it.
    pub async fn run(&self, handler: HandlerRef) -> Result<(), RuntimeError> {
        self.run_until(handler, shutdown::os_signal()).await
    }

    /// Runs the consumer pool; graceful shutdown starts when `shutdown` resolves.
    ///
    /// Cancelling [`Scopes::fetch`] directly has the same effect.
    pub async fn run_until<F>(&self, handler: HandlerRef, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            tracing::warn!("supervisor already started; refusing to run again");
            return Err(RuntimeError::AlreadyStarted);
        }
        let observer = shutdown::observe(self.scopes.clone(), shutdown);
        let handler = self.compose(handler);
        let total = self.cfg.fetchers_clamped();

        tracing::info!(fetchers = total, queue = %self.cfg.queue_name, "starting queue consumers");
        let mut set = JoinSet::new();
        self.spawn_consumers(&mut set, &handler, total);

        let mut report = Report::new(total);
        self.drive_shutdown(&mut set, &mut report).await;

        self.scopes.delete().cancel();
        observer.abort();
        tracing::info!("shutdown complete");

        report.into_result()
    }

    /// Spawns `total` consumers sharing the fetch scope and the composed handler.
    fn spawn_consumers(&self, set: &mut JoinSet<Joined>, handler: &HandlerRef, total: usize) {
        for id in 0..total {
            let consumer = Consumer::new(id, Arc::clone(&self.queue), Arc::clone(handler))
                .with_backoff(self.cfg.receive_backoff);
            let fetch = self.scopes.fetch().clone();
            set.spawn(async move { (id, consumer.run(fetch).await) });
        }
    }

    /// Waits until either all consumers finish or shutdown is requested, then drains.
    async fn drive_shutdown(&self, set: &mut JoinSet<Joined>, report: &mut Report) {
        tokio::select! {
            _ = collect(set, report) => return,
            _ = self.scopes.fetch().cancelled() => {}
        }

        match self.cfg.grace_period() {
            None => collect(set, report).await,
            Some(grace) => self.wait_all_with_grace(set, report, grace).await,
        }
    }

    /// Waits for the remaining consumers for at most `grace`, aborting the rest.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<Joined>,
        report: &mut Report,
        grace: Duration,
    ) {
        let finished = tokio::time::timeout(grace, collect(set, report))
            .await
            .is_ok();
        if finished {
            return;
        }

        let stuck = set.len();
        tracing::warn!(grace = ?grace, stuck, "grace period exceeded; aborting consumers");
        set.shutdown().await;
        report.aborted = Some((grace, stuck));
    }
}

/// Joins consumers until the set is empty. Cancel safe.
async fn collect(set: &mut JoinSet<Joined>, report: &mut Report) {
    while let Some(joined) = set.join_next().await {
        report.record(joined);
    }
}

/// Outcomes of the consumers joined so far.
struct Report {
    total: usize,
    joined: usize,
    errors: Vec<String>,
    /// Grace period and number of consumers aborted when it ran out.
    aborted: Option<(Duration, usize)>,
}

impl Report {
    fn new(total: usize) -> Self {
        Self {
            total,
            joined: 0,
            errors: Vec::new(),
            aborted: None,
        }
    }

    fn record(&mut self, joined: Result<Joined, JoinError>) {
        self.joined += 1;
        let remaining = self.total.saturating_sub(self.joined);
        match joined {
            Ok((id, Ok(()))) => {
                tracing::info!(fetcher = id, remaining, "consumer stopped");
            }
            Ok((id, Err(e))) => {
                tracing::error!(fetcher = id, remaining, error = %e, "consumer failed");
                self.errors.push(format!("fetcher {id}: {e}"));
            }
            Err(e) => {
                tracing::error!(remaining, error = %e, "consumer panicked");
                self.errors.push(e.to_string());
            }
        }
    }

    fn into_result(self) -> Result<(), RuntimeError> {
        if let Some((grace, stuck)) = self.aborted {
            return Err(RuntimeError::GraceExceeded {
                grace,
                stuck,
                errors: self.errors,
            });
        }
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(RuntimeError::ConsumersFailed {
            failed: self.errors.len(),
            total: self.total,
            errors: self.errors,
        })
    }
}
