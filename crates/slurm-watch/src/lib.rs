//! Slurm resource watchers
//!
//! Turns the stateless list endpoints of slurmrestd into live streams of
//! change events. One generic engine serves every resource kind:
//!
//! - [`ResourceAdapter`]: per-kind identity, state and snapshot fetching
//! - [`diff`]: pure comparison of a [`StateTable`] against a fresh snapshot
//! - [`Poller`]: periodic loop that owns one table and feeds a bounded channel
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use slurm_client::SlurmClient;
//! use slurm_watch::{JobAdapter, Poller, WatchOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(SlurmClient::new("http://slurmrestd:6820".to_string(), "v0.0.44", None, None)?);
//! let poller = Poller::new(JobAdapter::new(client));
//! let token = CancellationToken::new();
//! let mut events = poller.watch(token.clone(), WatchOptions::default())?;
//! while let Some(event) = events.recv().await {
//!     println!("{} {} -> {}", event.id, event.change, event.new_state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod differ;
pub mod error;
pub mod event;
pub mod options;
pub mod poller;
pub mod resources;
pub mod state;

pub use adapter::{EventOf, ResourceAdapter};
pub use differ::{Diff, DiffPolicy, diff};
pub use error::WatchError;
pub use event::{ChangeEvent, ChangeType, ResourceKind};
pub use options::WatchOptions;
pub use poller::{DEFAULT_BUFFER_SIZE, DEFAULT_MIN_POLL_INTERVAL, DEFAULT_POLL_INTERVAL, Poller};
pub use resources::{
    JobAdapter, JobWatchFilter, NodeAdapter, NodeWatchFilter, PartitionAdapter, PartitionWatchFilter,
};
pub use state::{ResourceState, StateTable};
