//! Slurm API models
//!
//! Only the fields the watchers need are modelled: identity, state flags and
//! the attributes the watch filters match on. Unknown fields are ignored.
//! See: slurmrestd OpenAPI `v0.0.44_job_info`, `v0.0.44_node`, `v0.0.44_partition_info`.

use serde::{Deserialize, Serialize};

/// Error entry from the `errors` array of a slurmrestd response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self
            .description
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("unknown error");
        match self.error_number {
            Some(code) => write!(f, "{} (error {})", message, code),
            None => write!(f, "{}", message),
        }
    }
}

/// Job as returned by `GET /slurm/<version>/jobs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    /// Current state flags, e.g. `["RUNNING"]` or `["PENDING", "REQUEUED"]`
    #[serde(default)]
    pub job_state: Vec<String>,
}

/// Node as returned by `GET /slurm/<version>/nodes`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Node state flags, e.g. `["IDLE", "DRAIN"]`
    #[serde(default)]
    pub state: Vec<String>,
    #[serde(default)]
    pub partitions: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Nested `partition` block of a partition record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionStatus {
    #[serde(default)]
    pub state: Vec<String>,
}

/// Partition as returned by `GET /slurm/<version>/partitions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionStatus>,
}

impl Partition {
    /// State flags of the partition, empty when the API omitted them
    pub fn state(&self) -> &[String] {
        self.partition.as_ref().map(|p| p.state.as_slice()).unwrap_or(&[])
    }
}

/// Response envelope for the jobs endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// Response envelope for the nodes endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodesResponse {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// Response envelope for the partitions endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartitionsResponse {
    #[serde(default)]
    pub partitions: Vec<Partition>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// Options for listing jobs.
///
/// slurmrestd cannot filter the job list by these attributes, so the client
/// fetches everything and applies [`ListJobsOptions::matches`] itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListJobsOptions {
    /// Numeric uid or user name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
}

impl ListJobsOptions {
    /// Whether a job satisfies every populated option
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(user) = &self.user_id {
            let by_uid = job.user_id.is_some_and(|uid| uid.to_string() == *user);
            let by_name = job.user_name.as_deref() == Some(user.as_str());
            if !by_uid && !by_name {
                return false;
            }
        }
        if let Some(partition) = &self.partition {
            if job.partition.as_deref() != Some(partition.as_str()) {
                return false;
            }
        }
        any_state_matches(&self.states, &job.job_state)
    }
}

/// Options for listing nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListNodesOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
    /// Every listed feature must be present on the node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl ListNodesOptions {
    /// Whether a node satisfies every populated option
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(partition) = &self.partition {
            if !node.partitions.iter().any(|p| p == partition) {
                return false;
            }
        }
        if !self.features.iter().all(|f| node.features.contains(f)) {
            return false;
        }
        any_state_matches(&self.states, &node.state)
    }
}

/// Options for listing partitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPartitionsOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
}

impl ListPartitionsOptions {
    /// Whether a partition satisfies every populated option
    pub fn matches(&self, partition: &Partition) -> bool {
        any_state_matches(&self.states, partition.state())
    }
}

/// An empty wanted list matches everything; otherwise one flag must match (case-insensitive).
fn any_state_matches(wanted: &[String], flags: &[String]) -> bool {
    wanted.is_empty()
        || flags
            .iter()
            .any(|flag| wanted.iter().any(|w| w.eq_ignore_ascii_case(flag)))
}
