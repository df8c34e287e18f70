//! Slurm REST API client
//!
//! Implements the list endpoints of slurmrestd:
//! `/slurm/<version>/jobs`, `/slurm/<version>/nodes`, `/slurm/<version>/partitions`.

use crate::common::{HttpClient, check_api_errors};
use crate::error::SlurmError;
use crate::models::*;
use crate::slurm_trait::SlurmClientTrait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Slurm REST API client
#[derive(Debug, Clone)]
pub struct SlurmClient {
    http: HttpClient,
}

#[derive(Debug, Deserialize)]
struct PingResponse {
    #[serde(default)]
    errors: Vec<ApiError>,
}

impl SlurmClient {
    /// Create a new Slurm client
    ///
    /// # Arguments
    /// * `base_url` - slurmrestd base URL (e.g., "http://slurmrestd:6820")
    /// * `api_version` - REST API version segment (e.g., "v0.0.44")
    /// * `token` - JWT sent as `X-SLURM-USER-TOKEN`, if any
    /// * `user_name` - user sent as `X-SLURM-USER-NAME`, if any
    pub fn new(
        base_url: String,
        api_version: impl Into<String>,
        token: Option<String>,
        user_name: Option<String>,
    ) -> Result<Self, SlurmError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SlurmError::InvalidRequest(format!(
                "base URL must start with http:// or https://: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SlurmError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, api_version.into(), token, user_name),
        })
    }

    /// Get the REST API version this client talks to
    pub fn api_version(&self) -> &str {
        self.http.api_version()
    }

    /// Check connectivity and credentials against the ping endpoint.
    ///
    /// # Returns
    /// * `Ok(())` - slurmrestd is reachable and accepted the request
    /// * `Err(SlurmError)` - unreachable, rejected, or reported errors
    pub async fn ping(&self) -> Result<(), SlurmError> {
        debug!("Pinging slurmrestd at {}", self.http.base_url());
        let response: PingResponse = self.http.get("ping").await?;
        check_api_errors("ping", &response.errors)?;
        debug!("slurmrestd ping succeeded");
        Ok(())
    }
}

#[async_trait::async_trait]
impl SlurmClientTrait for SlurmClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    async fn list_jobs(&self, options: &ListJobsOptions) -> Result<Vec<Job>, SlurmError> {
        let response: JobsResponse = self.http.get("jobs").await?;
        check_api_errors("jobs", &response.errors)?;
        let total = response.jobs.len();
        let jobs: Vec<Job> = response
            .jobs
            .into_iter()
            .filter(|job| options.matches(job))
            .collect();
        debug!("Listed {} jobs ({} after filtering)", total, jobs.len());
        Ok(jobs)
    }

    async fn list_nodes(&self, options: &ListNodesOptions) -> Result<Vec<Node>, SlurmError> {
        let response: NodesResponse = self.http.get("nodes").await?;
        check_api_errors("nodes", &response.errors)?;
        let total = response.nodes.len();
        let nodes: Vec<Node> = response
            .nodes
            .into_iter()
            .filter(|node| options.matches(node))
            .collect();
        debug!("Listed {} nodes ({} after filtering)", total, nodes.len());
        Ok(nodes)
    }

    async fn list_partitions(&self, options: &ListPartitionsOptions) -> Result<Vec<Partition>, SlurmError> {
        let response: PartitionsResponse = self.http.get("partitions").await?;
        check_api_errors("partitions", &response.errors)?;
        let total = response.partitions.len();
        let partitions: Vec<Partition> = response
            .partitions
            .into_iter()
            .filter(|partition| options.matches(partition))
            .collect();
        debug!("Listed {} partitions ({} after filtering)", total, partitions.len());
        Ok(partitions)
    }
}
