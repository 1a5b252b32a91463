//! Server lifecycle: bind, serve, shut down on Ctrl-C.

use std::net::SocketAddr;

use crate::api::router::build_router;
use crate::api::types::AppContext;

/// Serve the application on `ctx.config.bind` until Ctrl-C.
pub async fn serve(ctx: AppContext) -> std::io::Result<()> {
    let bind = ctx.config.bind;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tracing::info!(addr = %addr, "Listening on http://{addr}");

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
