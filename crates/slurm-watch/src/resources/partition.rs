//! Partition adapter

use super::{REMOVED_STATE, name_allowed};
use crate::adapter::ResourceAdapter;
use crate::event::ResourceKind;
use crate::state::ResourceState;
use serde::Serialize;
use slurm_client::{ListPartitionsOptions, Partition, SlurmClientTrait, SlurmError};
use std::fmt;
use std::sync::Arc;

/// Partition watch filter: list options plus an explicit partition name list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionWatchFilter {
    /// Options applied by the list call
    #[serde(flatten)]
    pub list: ListPartitionsOptions,
    /// Partition names to watch; empty watches every partition
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partition_names: Vec<String>,
}

/// Watches partitions through [`SlurmClientTrait::list_partitions`]
#[derive(Clone)]
pub struct PartitionAdapter {
    client: Arc<dyn SlurmClientTrait>,
}

impl PartitionAdapter {
    /// Adapter listing partitions through `client`
    pub fn new(client: Arc<dyn SlurmClientTrait>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for PartitionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionAdapter")
            .field("base_url", &self.client.base_url())
            .finish()
    }
}

#[async_trait::async_trait]
impl ResourceAdapter for PartitionAdapter {
    type Resource = Partition;
    type Id = String;
    type Filter = PartitionWatchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Partition
    }

    fn identity(&self, partition: &Partition) -> Option<String> {
        partition.name.clone()
    }

    fn state(&self, partition: &Partition) -> ResourceState {
        ResourceState::from_flags(partition.state())
    }

    fn removed_state(&self) -> ResourceState {
        ResourceState::new(REMOVED_STATE)
    }

    fn matches(&self, partition: &Partition, filter: &PartitionWatchFilter) -> bool {
        partition
            .name
            .as_deref()
            .is_some_and(|name| name_allowed(&filter.partition_names, name))
    }

    async fn fetch_snapshot(&self, filter: &PartitionWatchFilter) -> Result<Vec<Partition>, SlurmError> {
        self.client.list_partitions(&filter.list).await
    }
}
