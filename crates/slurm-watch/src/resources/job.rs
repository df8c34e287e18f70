//! Job adapter

use crate::adapter::ResourceAdapter;
use crate::error::WatchError;
use crate::event::ResourceKind;
use crate::state::ResourceState;
use serde::Serialize;
use slurm_client::{Job, ListJobsOptions, SlurmClientTrait, SlurmError};
use std::fmt;
use std::sync::Arc;

/// Sentinel new-state for jobs that left the job list
pub const JOB_REMOVED_STATE: &str = "COMPLETED";

/// Terminal states labelled `fail`
const FAILED_STATES: [&str; 4] = ["FAILED", "TIMEOUT", "CANCELLED", "NODE_FAIL"];

/// Job watch filter: list options plus an explicit job id list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobWatchFilter {
    /// Options applied by the list call
    #[serde(flatten)]
    pub list: ListJobsOptions,
    /// Job ids as given by the subscriber; each must be a positive integer
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_ids: Vec<String>,
}

impl JobWatchFilter {
    fn allows_id(&self, id: i32) -> bool {
        self.job_ids.is_empty() || self.job_ids.iter().any(|s| s.trim().parse::<i32>() == Ok(id))
    }
}

/// Watches jobs through [`SlurmClientTrait::list_jobs`]
#[derive(Clone)]
pub struct JobAdapter {
    client: Arc<dyn SlurmClientTrait>,
}

impl JobAdapter {
    /// Adapter listing jobs through `client`
    pub fn new(client: Arc<dyn SlurmClientTrait>) -> Self {
        Self { client }
    }
}

impl fmt::Debug for JobAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobAdapter")
            .field("base_url", &self.client.base_url())
            .finish()
    }
}

#[async_trait::async_trait]
impl ResourceAdapter for JobAdapter {
    type Resource = Job;
    type Id = i32;
    type Filter = JobWatchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Job
    }

    fn identity(&self, job: &Job) -> Option<i32> {
        job.job_id
    }

    fn state(&self, job: &Job) -> ResourceState {
        ResourceState::from_flags(&job.job_state)
    }

    fn removed_state(&self) -> ResourceState {
        ResourceState::new(JOB_REMOVED_STATE)
    }

    fn transition(&self, old: &ResourceState, new: &ResourceState) -> Option<&'static str> {
        if new.has_flag("PENDING") {
            Some("pending")
        } else if new.has_flag("RUNNING") {
            Some(if old.has_flag("PENDING") { "start" } else { "running" })
        } else if new.has_flag("COMPLETED") {
            Some("end")
        } else if FAILED_STATES.iter().any(|s| new.has_flag(s)) {
            Some("fail")
        } else if new.has_flag("SUSPENDED") {
            Some("suspend")
        } else {
            None
        }
    }

    fn validate(&self, filter: &JobWatchFilter) -> Result<(), WatchError> {
        for raw in &filter.job_ids {
            match raw.trim().parse::<i32>() {
                Ok(id) if id > 0 => {}
                _ => {
                    return Err(WatchError::InvalidFilter(format!(
                        "job id must be a positive integer: {:?}",
                        raw
                    )));
                }
            }
        }
        Ok(())
    }

    fn matches(&self, job: &Job, filter: &JobWatchFilter) -> bool {
        job.job_id.is_some_and(|id| filter.allows_id(id))
    }

    async fn fetch_snapshot(&self, filter: &JobWatchFilter) -> Result<Vec<Job>, SlurmError> {
        self.client.list_jobs(&filter.list).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slurm_client::MockSlurmClient;

    fn adapter() -> JobAdapter {
        JobAdapter::new(Arc::new(MockSlurmClient::new("http://mock")))
    }

    fn job(id: i32, states: &[&str]) -> Job {
        Job {
            job_id: Some(id),
            job_state: states.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_non_numeric_job_ids() {
        let a = adapter();
        let ok = JobWatchFilter { job_ids: vec!["12".to_string(), " 7 ".to_string()], ..Default::default() };
        assert!(a.validate(&ok).is_ok());

        for bad in ["abc", "0", "-3", ""] {
            let filter = JobWatchFilter { job_ids: vec![bad.to_string()], ..Default::default() };
            assert!(
                matches!(a.validate(&filter), Err(WatchError::InvalidFilter(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_matches_job_id_list() {
        let a = adapter();
        let filter = JobWatchFilter { job_ids: vec!["1".to_string(), "3".to_string()], ..Default::default() };
        assert!(a.matches(&job(1, &["RUNNING"]), &filter));
        assert!(!a.matches(&job(2, &["RUNNING"]), &filter));
        assert!(a.matches(&job(2, &["RUNNING"]), &JobWatchFilter::default()));
    }

    #[test]
    fn test_state_normalizes_flags() {
        let a = adapter();
        assert_eq!(
            a.state(&job(1, &["REQUEUED", "PENDING"])),
            a.state(&job(1, &["PENDING", "REQUEUED"]))
        );
        assert_eq!(a.removed_state().as_str(), "COMPLETED");
    }

    #[test]
    fn test_transition_labels() {
        let a = adapter();
        let label = |old: &[&str], new: &[&str]| {
            a.transition(&ResourceState::from_flags(old), &ResourceState::from_flags(new))
        };
        assert_eq!(label(&["PENDING"], &["RUNNING"]), Some("start"));
        assert_eq!(label(&["SUSPENDED"], &["RUNNING"]), Some("running"));
        assert_eq!(label(&["RUNNING"], &["PENDING", "REQUEUED"]), Some("pending"));
        assert_eq!(label(&["RUNNING"], &["COMPLETED"]), Some("end"));
        assert_eq!(label(&["RUNNING"], &["TIMEOUT"]), Some("fail"));
        assert_eq!(label(&["RUNNING"], &["NODE_FAIL"]), Some("fail"));
        assert_eq!(label(&["RUNNING"], &["SUSPENDED"]), Some("suspend"));
        assert_eq!(label(&["RUNNING"], &["COMPLETING"]), None);
    }

    #[test]
    fn test_matches_leaves_list_options_to_the_source() {
        let a = adapter();
        let filter = JobWatchFilter {
            list: ListJobsOptions { states: vec!["PENDING".to_string()], ..Default::default() },
            ..Default::default()
        };
        assert!(a.matches(&job(1, &["RUNNING"]), &filter));
    }

    #[tokio::test]
    async fn test_fetch_applies_list_options() {
        let mock = MockSlurmClient::new("http://mock");
        mock.set_jobs(vec![job(1, &["RUNNING"]), job(2, &["PENDING"])]);
        let a = JobAdapter::new(Arc::new(mock));
        let filter = JobWatchFilter {
            list: ListJobsOptions { states: vec!["PENDING".to_string()], ..Default::default() },
            ..Default::default()
        };
        let ids: Vec<Option<i32>> = a.fetch_snapshot(&filter).await.unwrap().iter().map(|j| j.job_id).collect();
        assert_eq!(ids, vec![Some(2)]);
    }
}
