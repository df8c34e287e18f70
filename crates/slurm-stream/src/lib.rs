//! Server-Sent Events transport for Slurm resource watchers
//!
//! `GET /events?stream=<jobs|nodes|partitions>&...` starts one poller per
//! connection and forwards its change events as SSE frames:
//!
//! - `connected`: once, naming the stream and echoing the resolved options
//! - `job_event` / `node_event` / `partition_event`: one per change
//! - `stream_closed`: when the watcher ends on its own (e.g. `max_events`)
//! - `error`: bad request or failed start, then the stream ends
//!
//! Errors are reported in-band; the HTTP status is always 200.

pub mod bridge;
#[cfg(test)]
mod bridge_test;
pub mod error;
pub mod frame;
pub mod query;
pub mod router;

pub use bridge::{BridgeConfig, SseBridge};
pub use error::StreamError;
pub use frame::SseFrame;
pub use query::{StreamKind, StreamRequest, parse_string_list};
pub use router::{SERVICE_NAME, router};
