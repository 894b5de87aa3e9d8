//! Ringsight server binary.
//!
//! Resolves configuration from the environment, wires the HTTP detection
//! client, spawns the retention sweep and serves the API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use ringsight_detector::HttpDetectionService;
use ringsight_server::{create_app, spawn_retention_sweep, AppState, ServerConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let detector = Arc::new(HttpDetectionService::new(
        config.detector_url.as_str(),
        config.detection_timeout,
    )?);
    let state = AppState::new(config, detector);

    spawn_retention_sweep(
        state.jobs.clone(),
        state.config.retention,
        state.config.sweep_interval,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    eprintln!("\n  ringsight v{}\n", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "  \u{2192} http://localhost:{}  (model service: {})\n",
        state.config.port, state.config.detector_url
    );
    tracing::info!(
        port = state.config.port,
        detector_url = %state.config.detector_url,
        "Server listening"
    );

    let app = create_app(state);
    axum::serve(listener, app).await?;
    Ok(())
}
