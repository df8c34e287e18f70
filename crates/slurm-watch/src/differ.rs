//! Snapshot differ.
//!
//! Compares the previous [`StateTable`] with a fresh, already filtered
//! snapshot and produces the change events plus the next table. Pure and
//! deterministic: the caller supplies the timestamp.
//!
//! Event order is: `new` / `state_change` in snapshot order, then `removed`
//! in identity order.
//!
//! A resource that stops matching an identity filter is indistinguishable
//! from one that left the cluster; both are reported as `removed`.

use crate::adapter::{EventOf, ResourceAdapter};
use crate::event::{ChangeEvent, ChangeType};
use crate::state::StateTable;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Notification policy for one diff pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffPolicy {
    /// First successful poll of this watch (the table is still empty)
    pub initial: bool,
    /// Emit `new` events on the initial poll instead of seeding silently
    pub notify_new_on_initial: bool,
    /// Never emit `new` events (resources are still tracked)
    pub exclude_new: bool,
    /// Never emit `removed` events (resources are still dropped from the table)
    pub exclude_removed: bool,
}

impl DiffPolicy {
    fn emits_new(&self) -> bool {
        !self.exclude_new && (!self.initial || self.notify_new_on_initial)
    }
}

/// Result of one diff pass
#[derive(Debug)]
pub struct Diff<A: ResourceAdapter + ?Sized> {
    /// Events in emission order
    pub events: Vec<EventOf<A>>,
    /// Table to use for the next pass
    pub next: StateTable<A::Id>,
}

/// Diff `snapshot` against `previous`.
///
/// Resources without an identity are skipped. If an identity appears more
/// than once in the snapshot, the first occurrence wins.
pub fn diff<A: ResourceAdapter + ?Sized>(
    adapter: &A,
    previous: &StateTable<A::Id>,
    snapshot: Vec<A::Resource>,
    policy: DiffPolicy,
    now: DateTime<Utc>,
) -> Diff<A> {
    let kind = adapter.kind();
    let mut seen = BTreeSet::new();
    let mut next = StateTable::new();
    let mut events = Vec::new();

    for resource in snapshot {
        let Some(id) = adapter.identity(&resource) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        let state = adapter.state(&resource);

        match previous.get(&id) {
            None => {
                next.insert(id.clone(), state.clone());
                if policy.emits_new() {
                    events.push(ChangeEvent {
                        kind,
                        change: ChangeType::New,
                        id,
                        old_state: None,
                        new_state: state,
                        transition: None,
                        timestamp: now,
                        resource: Some(resource),
                    });
                }
            }
            Some(old) if *old == state => {
                next.insert(id, state);
            }
            Some(old) => {
                next.insert(id.clone(), state.clone());
                events.push(ChangeEvent {
                    kind,
                    change: ChangeType::StateChange,
                    id,
                    old_state: Some(old.clone()),
                    transition: adapter.transition(old, &state),
                    new_state: state,
                    timestamp: now,
                    resource: Some(resource),
                });
            }
        }
    }

    if !policy.exclude_removed {
        for (id, old) in previous.iter().filter(|(id, _)| !seen.contains(*id)) {
            events.push(ChangeEvent {
                kind,
                change: ChangeType::Removed,
                id: id.clone(),
                old_state: Some(old.clone()),
                new_state: adapter.removed_state(),
                transition: None,
                timestamp: now,
                resource: None,
            });
        }
    }

    Diff { events, next }
}
