//! Per-watch options shared by every resource kind.

use crate::event::ChangeType;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Options for one watch: the kind-specific filter plus notification policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchOptions<F> {
    #[serde(flatten)]
    pub filter: F,
    /// Do not emit events for newly appearing resources
    #[serde(skip_serializing_if = "is_false")]
    pub exclude_new: bool,
    /// Do not emit events for resources that disappeared
    #[serde(skip_serializing_if = "is_false")]
    pub exclude_removed: bool,
    /// Emit `new` events for everything seen on the first poll instead of
    /// seeding the table silently
    #[serde(skip_serializing_if = "is_false")]
    pub notify_new_on_initial: bool,
    /// Only emit these change types; empty means all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_types: Vec<ChangeType>,
    /// Stop the watch after this many emitted events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_events: Option<usize>,
    /// Override of the poller's interval (still subject to its floor)
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "as_secs")]
    pub poll_interval: Option<Duration>,
}

impl<F> WatchOptions<F> {
    /// Options with the given filter and default notification policy
    pub fn with_filter(filter: F) -> Self {
        Self {
            filter,
            exclude_new: false,
            exclude_removed: false,
            notify_new_on_initial: false,
            event_types: Vec::new(),
            max_events: None,
            poll_interval: None,
        }
    }

    /// Whether events of this type pass the `event_types` filter
    pub fn emits(&self, change: ChangeType) -> bool {
        self.event_types.is_empty() || self.event_types.contains(&change)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn as_secs<S: Serializer>(interval: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match interval {
        Some(d) => serializer.serialize_some(&d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    struct Filter {
        partition: Option<String>,
    }

    #[test]
    fn test_emits_respects_event_types() {
        let mut options = WatchOptions::with_filter(Filter::default());
        assert!(options.emits(ChangeType::Removed));
        options.event_types = vec![ChangeType::New];
        assert!(options.emits(ChangeType::New));
        assert!(!options.emits(ChangeType::Removed));
    }

    #[test]
    fn test_serializes_flattened_filter_and_set_options_only() {
        let mut options = WatchOptions::with_filter(Filter { partition: Some("gpu".to_string()) });
        options.exclude_removed = true;
        options.poll_interval = Some(Duration::from_millis(2500));
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"partition": "gpu", "exclude_removed": true, "poll_interval": 2.5})
        );
    }
}
