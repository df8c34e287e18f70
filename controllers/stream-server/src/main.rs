//! Slurm Stream Server
//!
//! Streams Slurm resource changes to HTTP clients as Server-Sent Events:
//! - `GET /events?stream=jobs`: job submissions, state changes and completions
//! - `GET /events?stream=nodes`: node state changes (drain, down, ...)
//! - `GET /events?stream=partitions`: partition state changes
//! - `GET /health`: liveness probe
//!
//! Each subscription polls slurmrestd on its own and only reports differences.

mod config;
mod controller;
mod error;

use crate::config::ServerConfig;
use crate::error::ServerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Slurm Stream Server");

    let config = ServerConfig::from_env()?;

    info!("Configuration:");
    info!("  slurmrestd URL: {}", config.slurm_url);
    info!("  API version: {}", config.api_version);
    info!("  Authentication: {}", if config.token.is_some() { "JWT" } else { "none" });
    info!("  Listen address: {}", config.listen_addr);
    info!(
        "  Poll interval: {:?} (floor {:?})",
        config.bridge.poll_interval, config.bridge.min_poll_interval
    );
    info!("  Event buffer: {}", config.bridge.buffer_size);

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
