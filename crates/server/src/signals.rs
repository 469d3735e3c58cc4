//! Shutdown signal handling for the watch daemon.

/// Resolves on SIGTERM, SIGINT or Ctrl-C.
///
/// If a Unix handler cannot be installed, falls back to Ctrl-C only.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(
                target: "skillmatch::watch",
                error = %err,
                "Failed to install Unix signal handlers; waiting for Ctrl-C only"
            );
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!(target: "skillmatch::watch", "Received SIGTERM");
        }
        _ = sigint.recv() => {
            tracing::info!(target: "skillmatch::watch", "Received SIGINT");
        }
        _ = ctrl_c() => {}
    }
}

#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(target: "skillmatch::watch", "Received Ctrl-C"),
        Err(err) => {
            tracing::warn!(
                target: "skillmatch::watch",
                error = %err,
                "Ctrl-C handler unavailable"
            );
            // Never resolve; the daemon then stops only when its feed ends.
            std::future::pending::<()>().await;
        }
    }
}
