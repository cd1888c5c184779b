// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use recon_core::{DecisionId, ResourceId};
use std::time::Duration;

use crate::safety::SafetyCheck;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Pending,
    Executing,
    Success,
    Skipped,
    Failed,
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct DecisionResult {
    pub decision_id: DecisionId,
    pub status: ExecutionStatus,
    pub resource_id: Option<ResourceId>,
    pub message: Option<String>,
    pub safety_checks: Vec<SafetyCheck>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub results: Vec<DecisionResult>,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub partial_failure: bool,
    pub rollback_required: bool,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            successful: 0,
            failed: 0,
            skipped: 0,
            partial_failure: false,
            rollback_required: false,
            duration: Duration::ZERO,
        }
    }
}

/// The classification [`crate::executor::Executor::dry_run`] assigns to
/// a decision without invoking any provider or WAL write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunClass {
    Safe,
    Blocked,
    Destructive,
    Blessed,
}

#[derive(Debug, Clone)]
pub struct DryRunEntry {
    pub decision_id: DecisionId,
    pub class: DryRunClass,
    pub safety_checks: Vec<SafetyCheck>,
}

#[derive(Debug, Clone)]
pub struct DryRunResult {
    pub entries: Vec<DryRunEntry>,
    pub safe: usize,
    pub blocked: usize,
    pub destructive: usize,
    pub blessed: usize,
    pub estimated_duration: Duration,
}
