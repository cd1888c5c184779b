// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory materialized state: per-identity ordered observation history.

use chrono::{DateTime, Utc};
use recon_core::{Observation, Resource, ResourceIdentity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// JSON object keys must be strings; encode the identity tuple as one so the
/// history map round-trips through `serde_json` (used by snapshots).
fn identity_key(identity: &ResourceIdentity) -> String {
    format!(
        "{}/{}/{}/{}",
        identity.provider,
        identity.account,
        identity.region,
        identity.id.as_str()
    )
}

/// Materialized state built from the observation history: for each resource
/// identity, the full time-ordered sequence of observations (including
/// disappearance tombstones).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    history: HashMap<String, Vec<Observation>>,
}

impl MaterializedState {
    pub fn push(&mut self, identity: &ResourceIdentity, observation: Observation) {
        self.history
            .entry(identity_key(identity))
            .or_default()
            .push(observation);
    }

    /// The latest observation for this identity, whatever it is (including a
    /// disappearance tombstone).
    pub fn last(&self, identity: &ResourceIdentity) -> Option<&Observation> {
        self.history.get(&identity_key(identity)).and_then(|h| h.last())
    }

    /// The latest *present* observation, or `None` if never observed or the
    /// most recent observation was a disappearance.
    pub fn current(&self, identity: &ResourceIdentity) -> Option<&Resource> {
        self.last(identity)
            .filter(|o| !o.disappeared)
            .map(|o| &o.resource)
    }

    pub fn history_for(
        &self,
        identity: &ResourceIdentity,
        since: Option<DateTime<Utc>>,
    ) -> Vec<Observation> {
        self.history
            .get(&identity_key(identity))
            .map(|h| {
                h.iter()
                    .filter(|o| since.map(|s| o.observed_at > s).unwrap_or(true))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every identity's full ordered history (used for change-event
    /// derivation and the disappearance sweep).
    pub fn all_histories(&self) -> impl Iterator<Item = &Vec<Observation>> {
        self.history.values()
    }

    /// Resources whose latest observation is present (not a disappearance)
    /// and was observed strictly before `cutoff`.
    pub fn present_before(&self, cutoff: DateTime<Utc>) -> Vec<Resource> {
        self.history
            .values()
            .filter_map(|h| h.last())
            .filter(|o| !o.disappeared && o.observed_at < cutoff)
            .map(|o| o.resource.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
