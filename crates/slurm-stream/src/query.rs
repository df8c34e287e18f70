//! Query parameter parsing for `GET /events`.
//!
//! `stream` selects the resource kind; everything else is translated into
//! that kind's [`WatchOptions`]. Multi-valued parameters are comma separated.

use crate::error::StreamError;
use serde::Serialize;
use slurm_client::{ListJobsOptions, ListNodesOptions, ListPartitionsOptions};
use slurm_watch::{ChangeType, JobWatchFilter, NodeWatchFilter, PartitionWatchFilter, ResourceKind, WatchOptions};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Split a comma separated value, trimming each element and dropping empties
pub fn parse_string_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Value of the `stream` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// `stream=jobs`
    Jobs,
    /// `stream=nodes`
    Nodes,
    /// `stream=partitions`
    Partitions,
}

impl StreamKind {
    /// Query parameter value
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Jobs => "jobs",
            StreamKind::Nodes => "nodes",
            StreamKind::Partitions => "partitions",
        }
    }

    /// Watched resource kind
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            StreamKind::Jobs => ResourceKind::Job,
            StreamKind::Nodes => ResourceKind::Node,
            StreamKind::Partitions => ResourceKind::Partition,
        }
    }

    /// SSE event name for change frames (`job_event`, ...)
    pub fn event_name(self) -> String {
        format!("{}_event", self.resource_kind())
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobs" => Ok(StreamKind::Jobs),
            "nodes" => Ok(StreamKind::Nodes),
            "partitions" => Ok(StreamKind::Partitions),
            other => Err(StreamError::UnknownStream(other.to_string())),
        }
    }
}

/// A fully parsed subscription
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRequest {
    /// Job watch
    Jobs(WatchOptions<JobWatchFilter>),
    /// Node watch
    Nodes(WatchOptions<NodeWatchFilter>),
    /// Partition watch
    Partitions(WatchOptions<PartitionWatchFilter>),
}

impl StreamRequest {
    /// Stream kind of the request
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamRequest::Jobs(_) => StreamKind::Jobs,
            StreamRequest::Nodes(_) => StreamKind::Nodes,
            StreamRequest::Partitions(_) => StreamKind::Partitions,
        }
    }

    /// Parse the `/events` query string.
    ///
    /// `stream` picks the kind; every other parameter is optional.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, StreamError> {
        let params = Params(query);
        let kind: StreamKind = params.text("stream").ok_or(StreamError::MissingStream)?.parse()?;

        let request = match kind {
            StreamKind::Jobs => StreamRequest::Jobs(params.options(JobWatchFilter {
                list: ListJobsOptions {
                    user_id: params.text("user_id").map(str::to_string),
                    partition: params.text("partition").map(str::to_string),
                    states: params.list("states"),
                },
                job_ids: params.list("job_ids"),
            })?),
            StreamKind::Nodes => StreamRequest::Nodes(params.options(NodeWatchFilter {
                list: ListNodesOptions {
                    partition: params.text("partition").map(str::to_string),
                    states: params.list("states"),
                    features: params.list("features"),
                },
                node_names: params.list("node_names"),
            })?),
            StreamKind::Partitions => StreamRequest::Partitions(params.options(PartitionWatchFilter {
                list: ListPartitionsOptions {
                    states: params.list("states"),
                },
                partition_names: params.list("partition_names"),
            })?),
        };
        Ok(request)
    }
}

struct Params<'a>(&'a HashMap<String, String>);

impl Params<'_> {
    /// Non-blank value of a parameter
    fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    fn list(&self, name: &str) -> Vec<String> {
        self.0.get(name).map(|v| parse_string_list(v)).unwrap_or_default()
    }

    fn flag(&self, name: &'static str) -> Result<bool, StreamError> {
        match self.text(name) {
            None => Ok(false),
            Some("true" | "1") => Ok(true),
            Some("false" | "0") => Ok(false),
            Some(other) => Err(StreamError::invalid(name, format!("expected true or false, got {:?}", other))),
        }
    }

    fn options<F>(&self, filter: F) -> Result<WatchOptions<F>, StreamError> {
        let event_types = self
            .list("event_types")
            .iter()
            .map(|s| s.parse::<ChangeType>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StreamError::invalid("event_types", e))?;

        let max_events = match self.text("max_events") {
            None => None,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(StreamError::invalid("max_events", format!("expected a positive integer, got {:?}", raw))),
            },
        };

        let poll_interval = match self.text("poll_interval") {
            None => None,
            Some(raw) => Some(parse_seconds(raw).ok_or_else(|| {
                StreamError::invalid("poll_interval", format!("expected a positive number of seconds, got {:?}", raw))
            })?),
        };

        Ok(WatchOptions {
            filter,
            exclude_new: self.flag("exclude_new")?,
            exclude_removed: self.flag("exclude_removed")?,
            notify_new_on_initial: self.flag("notify_initial")?,
            event_types,
            max_events,
            poll_interval,
        })
    }
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok().filter(|d| !d.is_zero())
}
