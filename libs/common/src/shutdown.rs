//! Shutdown signal handling for the HTTP facade

use tracing::{info, warn};

/// Resolve once Ctrl+C (or SIGTERM on Unix) arrives
///
/// Intended for `axum::serve(..).with_graceful_shutdown(wait_for_shutdown())`.
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!("SIGTERM handler unavailable, Ctrl+C only: {}", e);
                None
            },
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Ctrl+C received"),
            _ = async {
                match term_signal.as_mut() {
                    Some(sig) => { sig.recv().await; },
                    None => std::future::pending::<()>().await,
                }
            } => info!("SIGTERM received"),
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl+C handler failed: {}", e);
        }
        info!("Ctrl+C received");
    }
}
