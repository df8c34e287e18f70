//! Server-specific error types.
//!
//! Everything here is fatal at startup. Once serving, per-connection
//! problems are reported to the subscriber in-band and never reach `main`.

use slurm_client::SlurmError;
use thiserror::Error;

/// Errors that can occur in the stream server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Listener or serve failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Slurm client could not be built
    #[error("Slurm client error: {0}")]
    Client(#[from] SlurmError),
}
