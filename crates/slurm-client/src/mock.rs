//! Mock SlurmClient for unit testing
//!
//! Stores the current jobs, nodes and partitions in memory so tests can
//! script a sequence of snapshots, and can be told to fail the next few
//! list calls to simulate a flaky slurmrestd.

use crate::error::SlurmError;
use crate::models::*;
use crate::slurm_trait::SlurmClientTrait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock SlurmClient for testing
///
/// Clones share state, so a test can keep one handle to mutate the
/// snapshot while a watcher polls another.
#[derive(Debug, Clone)]
pub struct MockSlurmClient {
    base_url: String,
    jobs: Arc<Mutex<Vec<Job>>>,
    nodes: Arc<Mutex<Vec<Node>>>,
    partitions: Arc<Mutex<Vec<Partition>>>,
    // Number of upcoming list calls that should fail
    pending_failures: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockSlurmClient {
    /// Create a new mock client with empty snapshots
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            jobs: Arc::new(Mutex::new(Vec::new())),
            nodes: Arc::new(Mutex::new(Vec::new())),
            partitions: Arc::new(Mutex::new(Vec::new())),
            pending_failures: Arc::new(AtomicUsize::new(0)),
            list_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the job snapshot returned by subsequent list calls
    pub fn set_jobs(&self, jobs: Vec<Job>) {
        *lock(&self.jobs) = jobs;
    }

    /// Replace the node snapshot returned by subsequent list calls
    pub fn set_nodes(&self, nodes: Vec<Node>) {
        *lock(&self.nodes) = nodes;
    }

    /// Replace the partition snapshot returned by subsequent list calls
    pub fn set_partitions(&self, partitions: Vec<Partition>) {
        *lock(&self.partitions) = partitions;
    }

    /// Make the next `count` list calls (of any kind) return an API error
    pub fn fail_next_lists(&self, count: usize) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Total number of list calls made so far, failed ones included
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self, endpoint: &str) -> Result<(), SlurmError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(SlurmError::Api(format!("mock failure listing {}", endpoint)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SlurmClientTrait for MockSlurmClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_jobs(&self, options: &ListJobsOptions) -> Result<Vec<Job>, SlurmError> {
        self.begin_call("jobs")?;
        Ok(lock(&self.jobs).iter().filter(|j| options.matches(j)).cloned().collect())
    }

    async fn list_nodes(&self, options: &ListNodesOptions) -> Result<Vec<Node>, SlurmError> {
        self.begin_call("nodes")?;
        Ok(lock(&self.nodes).iter().filter(|n| options.matches(n)).cloned().collect())
    }

    async fn list_partitions(&self, options: &ListPartitionsOptions) -> Result<Vec<Partition>, SlurmError> {
        self.begin_call("partitions")?;
        Ok(lock(&self.partitions)
            .iter()
            .filter(|p| options.matches(p))
            .cloned()
            .collect())
    }
}
