//! HTTP server lifecycle

use std::net::SocketAddr;

use anyhow::{Context, Result};
use dispatcher::ShutdownSignal;
use tracing::info;

use crate::handlers::AppState;
use crate::routes::router;

/// Serve the audit surface until the shutdown signal is raised.
///
/// In-flight requests are drained before this returns.
pub async fn serve(addr: SocketAddr, state: AppState, mut shutdown: ShutdownSignal) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.raised().await;
            info!("http server draining");
        })
        .await
        .context("http server error")?;

    info!("http server stopped");
    Ok(())
}
