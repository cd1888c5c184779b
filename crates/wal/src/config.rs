// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Tunables for a single WAL directory.
#[derive(Debug, Clone)]
pub struct WalConfig {
    /// Rotate to a new file once the active file reaches this many bytes.
    pub max_file_size: u64,
    /// `Cleanup` removes files whose last-modification time is older than this.
    pub retention_days: u64,
    /// File name prefix; files are named `{prefix}-{timestamp}.wal`.
    pub prefix: String,
    /// Group-commit interval: `needs_flush()` returns true once this elapses.
    pub flush_interval: Duration,
    /// Group-commit threshold: `needs_flush()` returns true once this many
    /// entries are buffered, regardless of interval.
    pub flush_threshold: usize,
}

impl Default for WalConfig {
    fn default() -> Self {
        Self {
            max_file_size: 64 * 1024 * 1024,
            retention_days: 30,
            prefix: "wal".to_string(),
            flush_interval: Duration::from_millis(10),
            flush_threshold: 100,
        }
    }
}
