//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`] an async helper that completes when the process
//! receives a termination signal, and [`observe`] which turns a shutdown trigger into
//! fetch-scope cancellation.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! Once tokio installs a handler for a signal it stays installed for the life of the
//! process, so signals arriving after the first one no longer terminate the process.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::core::Scopes;

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Resolves on the first OS termination signal.
///
/// If the listeners cannot be registered this never resolves; shutdown then has
/// to be requested through [`Scopes::cancel_fetch`].
pub async fn os_signal() {
    if let Err(e) = wait_for_shutdown_signal().await {
        tracing::warn!(error = %e, "could not install signal handlers");
        std::future::pending::<()>().await;
    }
}

/// Spawns the interrupt observer: when `trigger` resolves, only the fetch scope is cancelled.
pub fn observe<F>(scopes: Scopes, trigger: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = trigger => {
                if scopes.cancel_fetch() {
                    tracing::info!("starting graceful shutdown");
                } else {
                    tracing::debug!("shutdown already in progress");
                }
            }
            _ = scopes.fetch().cancelled() => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_cancels_fetch_only() {
        let scopes = Scopes::new();
        let handle = observe(scopes.clone(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        });
        handle.await.unwrap();

        assert!(scopes.fetch().is_cancelled());
        assert!(!scopes.delete().is_cancelled());
    }

    #[tokio::test]
    async fn observer_exits_when_fetch_cancelled_elsewhere() {
        let scopes = Scopes::new();
        let handle = observe(scopes.clone(), std::future::pending());
        scopes.cancel_fetch();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("observer should exit")
            .unwrap();
    }
}
