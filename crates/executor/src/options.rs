// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Knobs governing how a batch of decisions is executed.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Classify without invoking providers or writing to the WAL.
    pub dry_run: bool,
    /// Reserved: decisions within a batch execute sequentially regardless.
    pub max_concurrency: usize,
    /// Upper bound on a single decision's end-to-end execution time.
    pub timeout: Duration,
    pub skip_confirmation: bool,
    pub allow_destructive: bool,
    pub allow_blessed_changes: bool,
    pub continue_on_failure: bool,
    pub enable_rollback: bool,
    pub rollback_on_partial_fail: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_concurrency: 1,
            timeout: Duration::from_secs(30),
            skip_confirmation: false,
            allow_destructive: false,
            allow_blessed_changes: false,
            continue_on_failure: false,
            enable_rollback: true,
            rollback_on_partial_fail: false,
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
