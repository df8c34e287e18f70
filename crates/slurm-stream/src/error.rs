//! Stream request errors.
//!
//! None of these fail the HTTP request: each is written to the subscriber
//! as one in-band `error` frame before the stream ends.

use crate::query::StreamKind;
use slurm_watch::WatchError;
use thiserror::Error;

/// Reasons a subscription ends with an `error` frame
#[derive(Debug, Error)]
pub enum StreamError {
    /// No `stream` query parameter
    #[error("stream parameter required")]
    MissingStream,

    /// `stream` names no known resource kind
    #[error("unknown stream type: {0}")]
    UnknownStream(String),

    /// A query parameter could not be parsed
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// The watcher refused the resolved options
    #[error("failed to start {stream} stream: {source}")]
    Start {
        stream: StreamKind,
        #[source]
        source: WatchError,
    },
}

impl StreamError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        StreamError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
