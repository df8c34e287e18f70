//! Resource adapter trait.
//!
//! Everything the generic differ and poller need to know about one resource
//! kind: how to fetch a snapshot, how to identify a resource, and how to read
//! its state. Implemented once per kind in [`crate::resources`].

use crate::error::WatchError;
use crate::event::{ChangeEvent, ResourceKind};
use crate::state::ResourceState;
use serde::Serialize;
use slurm_client::SlurmError;
use std::fmt::{Debug, Display};

/// Change event type produced for adapter `A`
pub type EventOf<A> = ChangeEvent<<A as ResourceAdapter>::Id, <A as ResourceAdapter>::Resource>;

/// Capability set of one watched resource kind.
#[async_trait::async_trait]
pub trait ResourceAdapter: Send + Sync + 'static {
    /// Resource as returned by the snapshot source
    type Resource: Clone + Debug + Serialize + Send + Sync + 'static;
    /// Stable identity used to correlate resources across polls
    type Id: Clone + Debug + Display + Ord + Serialize + Send + Sync + 'static;
    /// Kind-specific watch filter
    type Filter: Clone + Debug + Default + Serialize + Send + Sync + 'static;

    /// Kind reported on every event
    fn kind(&self) -> ResourceKind;

    /// Identity of a resource; `None` when the source omitted it, in which
    /// case the resource cannot be tracked and is skipped.
    fn identity(&self, resource: &Self::Resource) -> Option<Self::Id>;

    /// Normalized state of a resource
    fn state(&self, resource: &Self::Resource) -> ResourceState;

    /// Sentinel reported as the new state of a removed resource
    fn removed_state(&self) -> ResourceState;

    /// Label for a state change, e.g. `start` or `drain`. `None` leaves the
    /// change unlabelled.
    fn transition(&self, _old: &ResourceState, _new: &ResourceState) -> Option<&'static str> {
        None
    }

    /// Reject structurally invalid filters before any polling starts
    fn validate(&self, _filter: &Self::Filter) -> Result<(), WatchError> {
        Ok(())
    }

    /// Client-side filtering for attributes the source cannot filter on.
    /// List options are applied by the source itself.
    fn matches(&self, resource: &Self::Resource, filter: &Self::Filter) -> bool;

    /// Fetch the current snapshot, translating the filter to native list options
    async fn fetch_snapshot(&self, filter: &Self::Filter) -> Result<Vec<Self::Resource>, SlurmError>;
}
