//! Resource adapters for the watched Slurm kinds.
//!
//! Handles: jobs (numeric id), nodes (name), partitions (name)

pub mod job;
pub mod node;
pub mod partition;

pub use job::{JobAdapter, JobWatchFilter};
pub use node::{NodeAdapter, NodeWatchFilter};
pub use partition::{PartitionAdapter, PartitionWatchFilter};

/// Sentinel new-state for removed nodes and partitions
pub const REMOVED_STATE: &str = "REMOVED";

/// An empty name list matches every name
fn name_allowed(names: &[String], name: &str) -> bool {
    names.is_empty() || names.iter().any(|n| n == name)
}
