// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping for successfully executed decisions. Reverse invocation
//! against a provider is reserved; this manager only records, computes
//! reversibility, and walks history in LIFO order.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use recon_core::{Action, Decision, Resource, ReverseAction, RollbackEntry};
use thiserror::Error;

/// Whether `action` can be undone, and what the reverse action is.
pub fn reversibility(action: Action) -> Option<ReverseAction> {
    match action {
        Action::Create => Some(ReverseAction::Delete),
        Action::Tag => Some(ReverseAction::Untag),
        Action::Noop => Some(ReverseAction::Noop),
        Action::Update | Action::Delete | Action::Terminate | Action::Notify => None,
    }
}

#[derive(Debug, Error)]
#[error("rollback had {0} failure(s)")]
pub struct RollbackError(pub Vec<String>);

#[derive(Debug, Clone)]
pub struct RollbackWarning {
    pub resource_id: String,
    pub message: String,
}

/// Records successful executions for the lifetime of the session and
/// performs best-effort bookkeeping for undoing them.
#[derive(Default)]
pub struct RollbackManager {
    entries: Mutex<Vec<RollbackEntry>>,
}

impl RollbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully executed decision.
    pub fn record_execution(
        &self,
        decision: Decision,
        original_state: Option<Resource>,
        executed_at: DateTime<Utc>,
    ) {
        let reverse_action = reversibility(decision.action);
        let can_rollback = reverse_action.is_some();
        self.entries.lock().push(RollbackEntry {
            decision,
            original_state,
            reverse_action,
            executed_at,
            can_rollback,
            rollback_reason: None,
        });
    }

    /// A defensive copy of the recorded history, oldest first.
    pub fn history(&self) -> Vec<RollbackEntry> {
        self.entries.lock().clone()
    }

    pub fn clear_history(&self) {
        self.entries.lock().clear();
    }

    /// Warn about entries that cannot be rolled back and about ordering
    /// hazards: two entries touching the same resource, where undoing out
    /// of order could leave the resource in an unintended state.
    pub fn validate_rollback_sequence(entries: &[RollbackEntry]) -> Vec<RollbackWarning> {
        let mut warnings = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for entry in entries {
            let resource_id = entry.decision.resource_id.as_str().to_string();
            if !entry.can_rollback {
                warnings.push(RollbackWarning {
                    resource_id: resource_id.clone(),
                    message: format!("{:?} is not reversible", entry.decision.action),
                });
            }
            if !seen.insert(resource_id.clone()) {
                warnings.push(RollbackWarning {
                    resource_id,
                    message: "multiple rollback entries share this resource_id".to_string(),
                });
            }
        }
        warnings
    }

    /// Process `entries` LIFO (last executed, first undone). This
    /// implementation performs bookkeeping only: it does not invoke a
    /// provider reverse action, matching the reserved scope of reverse
    /// invocation. Non-reversible or already-failed entries are collected
    /// into a combined error; reversible entries "succeed" trivially.
    pub fn rollback(entries: &[RollbackEntry]) -> Result<(), RollbackError> {
        let mut failures = Vec::new();
        for entry in entries.iter().rev() {
            if !entry.can_rollback {
                failures.push(format!(
                    "{}: {:?} is not reversible",
                    entry.decision.resource_id, entry.decision.action
                ));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RollbackError(failures))
        }
    }
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;
