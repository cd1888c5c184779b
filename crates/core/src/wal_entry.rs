// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The audit record type the WAL persists. Kept opaque at the payload
//! level: the WAL itself never interprets `payload`, only the caller does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The phase of decision/cycle processing an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalEntryType {
    Observed,
    Decided,
    Executing,
    Executed,
    Failed,
    Skipped,
    RollbackRecorded,
    RollbackExecuted,
    RollbackFailed,
}

/// A single append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
    pub entry_type: WalEntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
