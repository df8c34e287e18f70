//! Watch errors
//!
//! Only problems detected before a poller starts are errors. Once the loop
//! runs, snapshot failures are logged and the pass is skipped.

use thiserror::Error;

/// Errors returned synchronously by [`crate::Poller::watch`]
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watch filter or options are structurally invalid
    #[error("Invalid watch filter: {0}")]
    InvalidFilter(String),

    /// The poller itself is misconfigured (e.g. zero buffer size)
    #[error("Invalid poller configuration: {0}")]
    InvalidConfig(String),
}
