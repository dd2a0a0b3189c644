//! Fatigue gateway binary.
//!
//! - `POST /api/submit`: validated score -> one point in the write buffer
//! - `GET /health`: liveness
//! - SIGINT/SIGTERM: drain requests, then best-effort flush of the write buffer

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use fatigue_core::error::FatigueError;
use fatigue_gateway::sink::{InfluxWriter, PointWriter};
use fatigue_gateway::{app_state, config, host, router, shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatigue-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_from_env()?;
    let listen = cfg.gateway.listen_addr()?;
    let flush_timeout = cfg.write.shutdown_flush_timeout();
    let host = host::resolve_hostname();

    let writer: Arc<dyn PointWriter> = Arc::new(InfluxWriter::spawn(&cfg.influx, &cfg.write)?);
    tracing::info!(url = %cfg.influx.url, bucket = %cfg.influx.bucket, cors = ?cfg.cors, "time-series backend configured");

    let state = app_state::AppState::new(cfg, host.clone(), Arc::clone(&writer));
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| FatigueError::Configuration(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, %host, "fatigue-gateway starting");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await;

    // Runs whether or not serving failed.
    shutdown::flush_and_close(writer.as_ref(), flush_timeout).await;

    served?;
    tracing::info!("shutdown complete");
    Ok(())
}
