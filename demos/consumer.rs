//! # Example: consumer
//!
//! Runs a supervised consumer pool against an in-process queue fed by a producer,
//! exposes metrics over HTTP and drains gracefully on Ctrl-C.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► producer: push "msg-N" every 200ms
//!   ├─► MetricsReporter (5s tick) + GET http://127.0.0.1:8123/debug/vars
//!   └─► Supervisor::run(process_message)
//!         ├─► 4 fetchers, at most 3 handlers in flight
//!         ├─► Ctrl-C ─► "starting graceful shutdown"
//!         └─► all consumers joined ─► "shutdown complete"
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=queuevisor=debug,consumer=info cargo run --example consumer
//! ```

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use queuevisor::metrics::http;
use queuevisor::{
    Config, ExpvarRegistry, HandlerError, HandlerFn, MemoryQueue, MetricsReporter, Supervisor,
};

/// Build revision, set at compile time with `QUEUEVISOR_REVISION=<sha>`.
const REVISION: &str = match option_env!("QUEUEVISOR_REVISION") {
    Some(rev) => rev,
    None => "UNKNOWN",
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("queuevisor=info,consumer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cfg = Config {
        queue_name: "push_gcm".to_string(),
        fetchers: 4,
        max_in_flight: 3,
        ..Config::default()
    };

    // set up the queue and something feeding it
    let queue = Arc::new(MemoryQueue::with_wait_time(Duration::from_secs(20)));
    let producer = {
        let queue = Arc::clone(&queue);
        tokio::spawn(async move {
            let mut n = 0u64;
            loop {
                n += 1;
                queue.push(format!("msg-{n}"));
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        })
    };

    // set up metrics
    let registry = Arc::new(ExpvarRegistry::new());
    registry.set_string("version", REVISION);
    MetricsReporter::new(registry.clone(), cfg.metrics_interval).spawn();
    {
        let registry = Arc::clone(&registry);
        let addr = cfg.metrics_addr;
        tokio::spawn(async move {
            if let Err(e) = http::serve(addr, registry).await {
                tracing::warn!(error = %e, "metrics endpoint stopped");
            }
        });
    }

    let sup = Supervisor::builder(cfg, queue.clone())
        .with_metrics(registry.clone())
        .build();

    let result = sup.run(HandlerFn::arc(process_message)).await;
    producer.abort();

    tracing::info!(
        pending = queue.pending(),
        unacked = queue.in_flight().len(),
        acked = queue.deleted().len(),
        "final queue state"
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(label = e.as_label(), error = %e, "consumers terminated abnormally");
            ExitCode::FAILURE
        }
    }
}

/// Randomly fails, and otherwise honours cancellation before doing the "work".
async fn process_message(ctx: CancellationToken, msg: String) -> Result<(), HandlerError> {
    tracing::info!(%msg, "starting process_message");

    let roll = rand::rng().random_range(0..10);
    if roll < 3 {
        return Err(HandlerError::fail(format!(
            "a random error processing msg: {msg}"
        )));
    }
    if roll == 9 {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(3)) => {}
            _ = ctx.cancelled() => {}
        }
    }

    if ctx.is_cancelled() {
        tracing::info!(%msg, "context done so aborting processing message");
        return Err(HandlerError::Canceled);
    }

    tracing::info!("MSG: '{msg}'");
    Ok(())
}
