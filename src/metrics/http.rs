//! Axum exposition endpoint for an [`ExpvarRegistry`].
//!
//! Routes:
//! - `GET /debug/vars` every variable as one JSON object
//! - `GET /health`     liveness probe

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::metrics::ExpvarRegistry;

/// Builds the exposition router.
pub fn router(registry: Arc<ExpvarRegistry>) -> Router {
    Router::new()
        .route("/debug/vars", get(vars))
        .route("/health", get(health))
        .with_state(registry)
}

/// Serves the registry on `addr` until the listener fails.
pub async fn serve(addr: SocketAddr, registry: Arc<ExpvarRegistry>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "metrics exposed at /debug/vars");
    axum::serve(listener, router(registry)).await
}

async fn vars(State(registry): State<Arc<ExpvarRegistry>>) -> impl IntoResponse {
    Json(registry.snapshot())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
