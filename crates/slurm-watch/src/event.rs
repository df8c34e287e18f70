//! Change events emitted by watchers.

use crate::state::ResourceState;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Watched resource categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Batch job, keyed by numeric id
    Job,
    /// Compute node, keyed by name
    Node,
    /// Partition, keyed by name
    Partition,
}

impl ResourceKind {
    /// Lowercase name, also the payload field of the resource
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Job => "job",
            ResourceKind::Node => "node",
            ResourceKind::Partition => "partition",
        }
    }

    /// JSON field carrying the identity in serialized events
    pub fn id_field(self) -> &'static str {
        match self {
            ResourceKind::Job => "job_id",
            ResourceKind::Node => "node_name",
            ResourceKind::Partition => "partition_name",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a resource between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Resource appeared
    New,
    /// Resource state differs from the last poll
    StateChange,
    /// Resource left the snapshot
    Removed,
}

impl ChangeType {
    /// Wire name used in the `type` field
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::New => "new",
            ChangeType::StateChange => "state_change",
            ChangeType::Removed => "removed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ChangeType::New),
            "state_change" => Ok(ChangeType::StateChange),
            "removed" => Ok(ChangeType::Removed),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// One change observed by a poller.
///
/// `old_state` is absent for [`ChangeType::New`]. For [`ChangeType::Removed`]
/// `new_state` holds the kind's sentinel and `resource` is absent, since the
/// resource can no longer be fetched. `transition` is only set on
/// [`ChangeType::StateChange`], when the kind labels the transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent<I, R> {
    pub kind: ResourceKind,
    pub change: ChangeType,
    pub id: I,
    /// State before the change
    pub old_state: Option<ResourceState>,
    /// State after the change, or the removal sentinel
    pub new_state: ResourceState,
    /// Kind-specific label such as `start`, `fail` or `resume`
    pub transition: Option<&'static str>,
    /// Time of the poll that observed the change
    pub timestamp: DateTime<Utc>,
    /// Full resource for `new` and `state_change`
    pub resource: Option<R>,
}

// The identity field name depends on the kind (`job_id`, `node_name`, ...),
// so the wire shape is written by hand.
impl<I: Serialize, R: Serialize> Serialize for ChangeEvent<I, R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.change.as_str())?;
        map.serialize_entry(self.kind.id_field(), &self.id)?;
        if let Some(old) = &self.old_state {
            map.serialize_entry("old_state", old)?;
        }
        map.serialize_entry("new_state", &self.new_state)?;
        if let Some(transition) = self.transition {
            map.serialize_entry("transition", transition)?;
        }
        map.serialize_entry(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        if let Some(resource) = &self.resource {
            map.serialize_entry(self.kind.as_str(), resource)?;
        }
        map.end()
    }
}
