//! Main server implementation.
//!
//! Wires the Slurm client into the SSE bridge, serves the router and owns
//! the root cancellation token that graceful shutdown cancels.

use crate::config::ServerConfig;
use crate::error::ServerError;
use slurm_client::SlurmClient;
use slurm_stream::{SseBridge, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the bridge and the listener configuration
#[derive(Debug)]
pub struct Controller {
    bridge: Arc<SseBridge>,
    listen_addr: SocketAddr,
    shutdown: CancellationToken,
}

impl Controller {
    /// Build the client and the bridge.
    ///
    /// slurmrestd is pinged once; a failure is logged but does not stop the
    /// server, since pollers keep retrying on every tick anyway.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        info!("Initializing Slurm Stream Server");

        let client = SlurmClient::new(config.slurm_url.clone(), config.api_version, config.token, config.user_name)?;

        info!("Checking slurmrestd connectivity...");
        match client.ping().await {
            Ok(()) => info!("slurmrestd reachable at {}", config.slurm_url),
            Err(e) => {
                warn!("slurmrestd ping failed: {}", e);
                warn!("Streams will start anyway; snapshot failures are retried every poll");
            }
        }

        let shutdown = CancellationToken::new();
        let bridge = SseBridge::new(Arc::new(client), config.bridge, shutdown.clone());

        Ok(Self {
            bridge: Arc::new(bridge),
            listen_addr: config.listen_addr,
            shutdown,
        })
    }

    /// Serve until Ctrl-C or SIGTERM.
    ///
    /// The signal cancels the root token first, which ends every open event
    /// stream, so the graceful shutdown does not wait on idle subscribers.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutting down, closing open streams");
            shutdown.cancel();
        });

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router(self.bridge))
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C detected"),
        () = terminate => info!("SIGTERM detected"),
    }
}
