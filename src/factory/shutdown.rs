//! Closing every backend when the process is asked to stop.

use super::DbFactory;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, closing databases...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, closing databases...");
        }
    }
}

impl DbFactory {
    /// Spawn a task that runs [`close_all`](Self::close_all) once, when a
    /// shutdown signal arrives or `cancel_token` is cancelled.
    ///
    /// The task cancels `cancel_token` itself after a signal, so other tasks
    /// sharing the token stop too. Await the returned handle to know the
    /// close sweep has finished.
    pub fn spawn_close_on_shutdown(
        self: Arc<Self>,
        cancel_token: CancellationToken,
    ) -> JoinHandle<usize> {
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_signal() => cancel_token.cancel(),
                _ = cancel_token.cancelled() => {
                    tracing::debug!("Shutdown requested, closing databases");
                }
            }

            self.close_all().await
        })
    }
}
