// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The observation store: single-writer, many-reader MVCC over resource
//! observation history.

use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use recon_core::{ChangeEvent, Observation, Resource, ResourceIdentity};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no observation exists for this resource identity")]
    UnknownResource,
}

struct Inner {
    state: MaterializedState,
    sequence: u64,
}

/// Versioned, per-identity observation history with atomic batch recording.
///
/// Readers see a consistent snapshot as of the highest sequence committed
/// before they acquired the lock; the store is single-writer (one `Mutex`
/// guards both the sequence counter and the state).
pub struct ObservationStore {
    inner: Mutex<Inner>,
}

impl Default for ObservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: MaterializedState::default(),
                sequence: 0,
            }),
        }
    }

    /// Rehydrate from a previously checkpointed state and sequence, e.g.
    /// after loading a snapshot and replaying the WAL tail.
    pub fn from_state(state: MaterializedState, sequence: u64) -> Self {
        Self {
            inner: Mutex::new(Inner { state, sequence }),
        }
    }

    /// A clone of the current materialized state, for checkpointing.
    pub fn snapshot_state(&self) -> (MaterializedState, u64) {
        let inner = self.inner.lock();
        (inner.state.clone(), inner.sequence)
    }

    pub fn record_observation(&self, resource: Resource) -> u64 {
        let (first, _) = self.record_observation_batch(vec![resource]);
        first
    }

    /// Record a batch of observations atomically: either every observation
    /// becomes visible with a contiguous sequence range, or (on an empty
    /// batch) nothing changes. Returns the first sequence assigned and the
    /// batch's derived change events.
    pub fn record_observation_batch(&self, resources: Vec<Resource>) -> (u64, Vec<ChangeEvent>) {
        if resources.is_empty() {
            let inner = self.inner.lock();
            return (inner.sequence, Vec::new());
        }

        let mut inner = self.inner.lock();
        let first_sequence = inner.sequence + 1;
        let mut events = Vec::with_capacity(resources.len());

        for resource in resources {
            let identity = resource.identity();
            let previous = inner.state.last(&identity).cloned();

            inner.sequence += 1;
            let sequence = inner.sequence;
            let observed_at = resource.observed_at;

            let event = ChangeEvent::derive(
                resource.id.clone(),
                observed_at,
                previous.as_ref().map(|p| (&p.resource, p.disappeared)),
                &resource,
            );

            inner.state.push(
                &identity,
                Observation {
                    resource,
                    observed_at,
                    sequence,
                    disappeared: false,
                },
            );

            if let Some(event) = event {
                events.push(event);
            }
        }

        (first_sequence, events)
    }

    /// Append a tombstone observation marking a resource as no longer
    /// present. Fails if the identity has never been observed.
    pub fn record_disappearance(
        &self,
        identity: &ResourceIdentity,
        observed_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        let last = inner
            .state
            .last(identity)
            .cloned()
            .ok_or(StoreError::UnknownResource)?;

        inner.sequence += 1;
        let sequence = inner.sequence;
        inner.state.push(
            identity,
            Observation {
                resource: last.resource,
                observed_at,
                sequence,
                disappeared: true,
            },
        );
        Ok(sequence)
    }

    pub fn get_current(&self, identity: &ResourceIdentity) -> Option<Resource> {
        self.inner.lock().state.current(identity).cloned()
    }

    /// Look up the current resource by provider name and resource id alone,
    /// without the full identity tuple. Used by callers (the executor) that
    /// only know which provider a decision targets, not its region/account.
    pub fn find_current(&self, provider: &str, id: &recon_core::ResourceId) -> Option<Resource> {
        let inner = self.inner.lock();
        inner.state.all_histories().find_map(|history| {
            let last = history.last()?;
            if last.disappeared {
                return None;
            }
            if last.resource.provider == provider && &last.resource.id == id {
                Some(last.resource.clone())
            } else {
                None
            }
        })
    }

    pub fn get_history(
        &self,
        identity: &ResourceIdentity,
        since: Option<DateTime<Utc>>,
    ) -> Vec<Observation> {
        self.inner.lock().state.history_for(identity, since)
    }

    /// Recompute change events for every observation with sequence
    /// `>= batch_first_sequence`, comparing each against the observation
    /// immediately before it for the same identity.
    pub fn derive_change_events(&self, batch_first_sequence: u64) -> Vec<ChangeEvent> {
        let inner = self.inner.lock();
        let mut events = Vec::new();

        for history in inner.state.all_histories() {
            for (idx, obs) in history.iter().enumerate() {
                if obs.sequence < batch_first_sequence {
                    continue;
                }
                let prev = if idx == 0 { None } else { Some(&history[idx - 1]) };

                let event = if obs.disappeared {
                    prev.map(|p| {
                        ChangeEvent::disappeared(
                            obs.resource.id.clone(),
                            obs.observed_at,
                            p.resource.clone(),
                        )
                    })
                } else {
                    ChangeEvent::derive(
                        obs.resource.id.clone(),
                        obs.observed_at,
                        prev.map(|p| (&p.resource, p.disappeared)),
                        &obs.resource,
                    )
                };

                if let Some(event) = event {
                    events.push(event);
                }
            }
        }

        events.sort_by_key(|e| e.timestamp);
        events
    }

    /// Resources whose latest observation is present but strictly older
    /// than `cutoff` — candidates for the orchestrator's disappearance
    /// sweep. The store itself never records these; the caller decides.
    pub fn list_stale_since(&self, cutoff: DateTime<Utc>) -> Vec<Resource> {
        self.inner.lock().state.present_before(cutoff)
    }

    pub fn current_sequence(&self) -> u64 {
        self.inner.lock().sequence
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
