//! Node adapter

use super::{REMOVED_STATE, name_allowed};
use crate::adapter::ResourceAdapter;
use crate::event::ResourceKind;
use crate::state::ResourceState;
use serde::Serialize;
use slurm_client::{ListNodesOptions, Node, SlurmClientTrait, SlurmError};
use std::fmt;
use std::sync::Arc;

/// Node watch filter: list options plus an explicit node name list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeWatchFilter {
    /// Options applied by the list call
    #[serde(flatten)]
    pub list: ListNodesOptions,
    /// Node names to watch; empty watches every node
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_names: Vec<String>,
}

/// Watches nodes through [`SlurmClientTrait::list_nodes`]
#[derive(Clone)]
pub struct NodeAdapter {
    client: Arc<dyn SlurmClientTrait>,
}

impl NodeAdapter {
    /// Adapter listing nodes through `client`
    pub fn new(client: Arc<dyn SlurmClientTrait>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for NodeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAdapter")
            .field("base_url", &self.client.base_url())
            .finish()
    }
}

#[async_trait::async_trait]
impl ResourceAdapter for NodeAdapter {
    type Resource = Node;
    type Id = String;
    type Filter = NodeWatchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Node
    }

    fn identity(&self, node: &Node) -> Option<String> {
        node.name.clone()
    }

    fn state(&self, node: &Node) -> ResourceState {
        ResourceState::from_flags(&node.state)
    }

    fn removed_state(&self) -> ResourceState {
        ResourceState::new(REMOVED_STATE)
    }

    // DRAIN wins over the base state, so IDLE+DRAIN is a drain
    fn transition(&self, old: &ResourceState, new: &ResourceState) -> Option<&'static str> {
        if new.has_flag("DRAIN") {
            Some("drain")
        } else if new.has_flag("IDLE") {
            Some(if old.has_flag("DRAIN") || old.has_flag("DOWN") { "resume" } else { "idle" })
        } else if new.has_flag("ALLOCATED") {
            Some("allocated")
        } else if new.has_flag("DOWN") {
            Some("down")
        } else if new.has_flag("MIXED") {
            Some("mixed")
        } else if new.has_flag("ERROR") {
            Some("error")
        } else {
            None
        }
    }

    fn matches(&self, node: &Node, filter: &NodeWatchFilter) -> bool {
        node.name
            .as_deref()
            .is_some_and(|name| name_allowed(&filter.node_names, name))
    }

    async fn fetch_snapshot(&self, filter: &NodeWatchFilter) -> Result<Vec<Node>, SlurmError> {
        self.client.list_nodes(&filter.list).await
    }
}
