//! Slurm client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Slurm REST API
#[derive(Debug, Error)]
pub enum SlurmError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// slurmrestd returned an error, either as a status code or in the
    /// `errors` array of the response envelope
    #[error("Slurm API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (missing, invalid or expired token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., malformed base URL)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
