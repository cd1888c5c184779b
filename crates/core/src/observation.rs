// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observations and the change events derived from them.

use crate::resource::{Resource, ResourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable snapshot of a resource at a point in the store's sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub resource: Resource,
    pub observed_at: DateTime<Utc>,
    pub sequence: u64,
    /// True if this observation records that the resource was no longer
    /// found on a scan (a tombstone), rather than a live snapshot.
    pub disappeared: bool,
}

/// The kind of drift a [`ChangeEvent`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Modified,
    TagsChanged,
    Disappeared,
}

/// A derived change in a resource's observed state between two observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub resource_id: ResourceId,
    pub timestamp: DateTime<Utc>,
    pub previous: Option<Resource>,
    pub current: Option<Resource>,
}

impl ChangeEvent {
    /// Derive the change kind (if any) implied by observing `current` right
    /// after `previous`, following the rules in the store's contract:
    ///   - no prior observation, or prior was a disappearance -> `Created`
    ///   - tags differ, nothing else does -> `TagsChanged`
    ///   - any other field differs -> `Modified`
    ///   - exact equality (including tags) -> no event
    pub fn derive(
        resource_id: ResourceId,
        timestamp: DateTime<Utc>,
        previous: Option<(&Resource, bool)>,
        current: &Resource,
    ) -> Option<ChangeEvent> {
        match previous {
            None => Some(ChangeEvent {
                kind: ChangeKind::Created,
                resource_id,
                timestamp,
                previous: None,
                current: Some(current.clone()),
            }),
            Some((_, true)) => Some(ChangeEvent {
                kind: ChangeKind::Created,
                resource_id,
                timestamp,
                previous: None,
                current: Some(current.clone()),
            }),
            Some((prev, false)) => {
                if prev.observably_equal(current) {
                    None
                } else if prev.tags_changed_only(current) {
                    Some(ChangeEvent {
                        kind: ChangeKind::TagsChanged,
                        resource_id,
                        timestamp,
                        previous: Some(prev.clone()),
                        current: Some(current.clone()),
                    })
                } else {
                    Some(ChangeEvent {
                        kind: ChangeKind::Modified,
                        resource_id,
                        timestamp,
                        previous: Some(prev.clone()),
                        current: Some(current.clone()),
                    })
                }
            }
        }
    }

    /// The disappearance event for a resource whose most recent observation
    /// fell silent: `previous` is the last known state, `current` is absent.
    pub fn disappeared(resource_id: ResourceId, timestamp: DateTime<Utc>, previous: Resource) -> ChangeEvent {
        ChangeEvent {
            kind: ChangeKind::Disappeared,
            resource_id,
            timestamp,
            previous: Some(previous),
            current: None,
        }
    }
}

#[cfg(test)]
#[path = "observation_tests.rs"]
mod tests;
