// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use telemetry_remote::infrastructure::config::load_config;
use telemetry_remote::infrastructure::influx_repository::InfluxRepository;
use telemetry_remote::presentation::app_state::AppState;
use telemetry_remote::presentation::router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config().context("Failed to load config/server")?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(config.influx));

    // Create application state
    let state = Arc::new(AppState { repository });

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting telemetry-remote service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
