//! Resource state values and the per-poller state table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separator used when several state flags are folded into one value
pub const FLAG_SEPARATOR: &str = "+";

/// Comparable state of one resource.
///
/// Multi-flag states such as `IDLE+DRAIN` are one value. Build them with
/// [`ResourceState::from_flags`], which sorts the flags so that the order
/// slurmrestd happens to report them in never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceState(String);

impl ResourceState {
    /// Wrap an already-normalized state string
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    /// Fold a list of flags into one value: trimmed, empties dropped,
    /// sorted, de-duplicated and joined with [`FLAG_SEPARATOR`].
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags: Vec<String> = flags
            .into_iter()
            .map(|f| f.as_ref().trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        flags.sort();
        flags.dedup();
        Self(flags.join(FLAG_SEPARATOR))
    }

    /// Normalized state string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Individual flags of a folded state
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.0.split(FLAG_SEPARATOR).filter(|f| !f.is_empty())
    }

    /// Whether `flag` is one of the folded flags
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags().any(|f| f == flag)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceState {
    fn from(state: &str) -> Self {
        Self::new(state)
    }
}

/// Last observed state of every tracked resource.
///
/// Owned by exactly one poller task and never shared, so it carries no lock.
/// Keys are ordered, which keeps removal events deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTable<I> {
    entries: BTreeMap<I, ResourceState>,
}

impl<I: Ord> StateTable<I> {
    /// Empty table
    pub fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Number of tracked resources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last observed state of `id`
    pub fn get(&self, id: &I) -> Option<&ResourceState> {
        self.entries.get(id)
    }

    /// Whether `id` is tracked
    pub fn contains(&self, id: &I) -> bool {
        self.entries.contains_key(id)
    }

    /// Track `id` with `state`, returning the state it replaces
    pub fn insert(&mut self, id: I, state: ResourceState) -> Option<ResourceState> {
        self.entries.insert(id, state)
    }

    /// Stop tracking `id`
    pub fn remove(&mut self, id: &I) -> Option<ResourceState> {
        self.entries.remove(id)
    }

    /// Entries in identity order
    pub fn iter(&self) -> impl Iterator<Item = (&I, &ResourceState)> {
        self.entries.iter()
    }
}

impl<I: Ord> Default for StateTable<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Ord> FromIterator<(I, ResourceState)> for StateTable<I> {
    fn from_iter<T: IntoIterator<Item = (I, ResourceState)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
