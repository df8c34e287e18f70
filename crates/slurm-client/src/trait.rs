//! SlurmClient trait for mocking
//!
//! This trait abstracts the SlurmClient so watchers can be driven by a mock
//! snapshot source in unit tests.

use crate::error::SlurmError;
use crate::models::*;

/// Trait for Slurm list operations
///
/// Each method returns the complete current set of resources matching the
/// options. Implementations decide how to paginate and authenticate; callers
/// only see the final list or an error.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait SlurmClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    async fn list_jobs(&self, options: &ListJobsOptions) -> Result<Vec<Job>, SlurmError>;
    async fn list_nodes(&self, options: &ListNodesOptions) -> Result<Vec<Node>, SlurmError>;
    async fn list_partitions(&self, options: &ListPartitionsOptions) -> Result<Vec<Partition>, SlurmError>;
}
