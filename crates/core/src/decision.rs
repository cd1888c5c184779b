// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy decisions: the output of policy evaluation, the input to the executor.

use crate::resource::{Action, ResourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for a decision.
    pub struct DecisionId;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecisionValidationError {
    #[error("reason must be non-empty for destructive action {action:?}")]
    MissingReason { action: Action },
    #[error("resource_id must be non-empty for action {action:?}")]
    MissingResourceId { action: Action },
}

/// A single policy decision: what to do about one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub action: Action,
    /// Name the decision's provider is registered under (see
    /// `ProviderMap::get` in `recon-providers`). Required to resolve which
    /// cloud account the executor dispatches the action against.
    pub provider: String,
    pub resource_id: ResourceId,
    pub resource_type: String,
    pub reason: String,
    pub is_blessed: bool,
    pub created_at: DateTime<Utc>,
}

impl Decision {
    /// Construct a decision, enforcing the invariants from the data model:
    /// `reason` non-empty for destructive actions, `resource_id` non-empty
    /// for every action except `create`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DecisionId,
        action: Action,
        provider: impl Into<String>,
        resource_id: ResourceId,
        resource_type: impl Into<String>,
        reason: impl Into<String>,
        is_blessed: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DecisionValidationError> {
        let reason = reason.into();
        if action.is_destructive() && reason.trim().is_empty() {
            return Err(DecisionValidationError::MissingReason { action });
        }
        if !matches!(action, Action::Create) && resource_id.as_str().trim().is_empty() {
            return Err(DecisionValidationError::MissingResourceId { action });
        }
        Ok(Self {
            id,
            action,
            provider: provider.into(),
            resource_id,
            resource_type: resource_type.into(),
            reason,
            is_blessed,
            created_at,
        })
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
