//! Graceful shutdown handling.
//!
//! On SIGINT/SIGTERM the listener stops accepting, every connection task is
//! told to close, and each connection gets a bounded grace period to finish
//! its close handshake before its task exits. In-flight writes that miss
//! the grace period are dropped.

use std::time::Duration;

use tokio::signal;
use tokio::sync::broadcast;

/// Bounds for per-connection shutdown work
#[derive(Debug, Clone, Copy)]
pub struct GraceConfig {
    /// Time each connection may spend completing its close handshake
    pub close_grace: Duration,
}

impl Default for GraceConfig {
    fn default() -> Self {
        Self {
            close_grace: Duration::from_secs(3),
        }
    }
}

/// Resolves when the process receives an interrupt, after telling every
/// connection task to begin closing.
pub async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Tell connection tasks to close; nothing to do if none are open
    let _ = shutdown_tx.send(());
}
