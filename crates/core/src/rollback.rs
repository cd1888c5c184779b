// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollback bookkeeping types shared between the executor and the rollback manager.

use crate::decision::Decision;
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The action that would undo a successfully executed decision, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReverseAction {
    Delete,
    Untag,
    Noop,
}

/// A record of a successfully executed decision, kept so it can be undone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackEntry {
    pub decision: Decision,
    pub original_state: Option<Resource>,
    pub reverse_action: Option<ReverseAction>,
    pub executed_at: DateTime<Utc>,
    pub can_rollback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_reason: Option<String>,
}
