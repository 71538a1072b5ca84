//! Serve the API on a TCP listener until Ctrl-C.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::analyze::Analyzer;
use crate::api::router::api_router;

/// Bind `addr` and serve until the process receives Ctrl-C.
pub async fn serve(addr: SocketAddr, analyzer: Analyzer) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Analyzer API listening");

    axum::serve(listener, api_router(analyzer))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining in-flight requests");
}
