//! HTTP server lifecycle.

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};

/// Bind and serve until the process is asked to stop. Returning hands
/// control back to `main`, which then winds down the reconciliation
/// pipeline and the database pool.
pub async fn run_server(router: Router, addr: &str) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_termination())
        .await
}

/// Resolves once SIGTERM or Ctrl-C arrives, logging which one stopped us.
async fn wait_for_termination() {
    let mut term = signal(SignalKind::terminate()).expect("failed to listen for SIGTERM");

    let stopped_by = tokio::select! {
        _ = tokio::signal::ctrl_c() => "interrupt",
        _ = term.recv() => "terminate",
    };

    tracing::info!(signal = stopped_by, "stop requested, draining connections");
}
