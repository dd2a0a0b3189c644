//! Graceful shutdown: signal handling and the best-effort write-buffer flush.

use std::time::Duration;

use fatigue_core::error::FatigueError;

use crate::sink::PointWriter;

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}

/// Flush, then close, the write buffer.
///
/// Best-effort and non-propagating: each step is bounded by `timeout`, and a
/// failure is logged as `ShutdownFlush` and then discarded so the process can
/// still exit cleanly. Returns the suppressed errors for callers that want to
/// inspect them.
pub async fn flush_and_close(writer: &dyn PointWriter, timeout: Duration) -> Vec<FatigueError> {
    let mut suppressed = Vec::new();

    match tokio::time::timeout(timeout, writer.flush()).await {
        Ok(Ok(())) => tracing::info!("write buffer flushed"),
        Ok(Err(e)) => suppressed.push(FatigueError::ShutdownFlush(e.to_string())),
        Err(_) => suppressed.push(FatigueError::ShutdownFlush(format!(
            "flush timed out after {}ms",
            timeout.as_millis()
        ))),
    }

    match tokio::time::timeout(timeout, writer.close()).await {
        Ok(Ok(())) => tracing::info!("write buffer closed"),
        Ok(Err(e)) => suppressed.push(FatigueError::ShutdownFlush(format!("close: {e}"))),
        Err(_) => suppressed.push(FatigueError::ShutdownFlush(format!(
            "close timed out after {}ms",
            timeout.as_millis()
        ))),
    }

    for e in &suppressed {
        tracing::warn!(error = %e, "ignored during shutdown");
    }
    suppressed
}
