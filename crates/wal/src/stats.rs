// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Introspection: stats, health, and retention cleanup over a WAL directory.

use crate::config::WalConfig;
use crate::wal::{list_wal_files, Wal, WalError};
use chrono::{DateTime, Utc};
use recon_core::WalEntry;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Result of a [`Wal::cleanup`] pass.
#[derive(Debug, Clone, Default)]
pub struct CleanupStats {
    pub removed_files: usize,
    pub bytes_freed: u64,
    pub oldest_removed: Option<DateTime<Utc>>,
    pub newest_removed: Option<DateTime<Utc>>,
}

/// Aggregate counts over every file in a WAL directory.
#[derive(Debug, Clone, Default)]
pub struct WalStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub first_sequence: Option<u64>,
    pub last_sequence: Option<u64>,
    pub entries_per_file: Vec<(PathBuf, u64)>,
}

/// Whether housekeeping is due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalHealth {
    pub rotation_due: bool,
    pub cleanup_due: bool,
    pub oldest_file_age_days: Option<f64>,
}

impl Wal {
    /// Remove files whose last-modification time is before
    /// `now - retention_days`. The active (most recent by name) file is
    /// never removed, even if stale, since it may still be open for append.
    pub fn cleanup(
        dir: &Path,
        prefix: &str,
        retention_days: u64,
        now: DateTime<Utc>,
    ) -> Result<CleanupStats, WalError> {
        let files = list_for_stats(dir, prefix)?;
        let mut stats = CleanupStats::default();
        if files.is_empty() {
            return Ok(stats);
        }

        let cutoff = now - chrono::Duration::days(retention_days as i64);
        let candidates = &files[..files.len() - 1];

        for path in candidates {
            let meta = fs::metadata(path)?;
            let modified: DateTime<Utc> = meta.modified()?.into();
            if modified >= cutoff {
                continue;
            }

            stats.removed_files += 1;
            stats.bytes_freed += meta.len();
            stats.oldest_removed = Some(match stats.oldest_removed {
                Some(existing) if existing <= modified => existing,
                _ => modified,
            });
            stats.newest_removed = Some(match stats.newest_removed {
                Some(existing) if existing >= modified => existing,
                _ => modified,
            });
            fs::remove_file(path)?;
        }

        Ok(stats)
    }

    /// O(files + entries) summary of a WAL directory.
    pub fn stats(dir: &Path, prefix: &str) -> Result<WalStats, WalError> {
        let files = list_for_stats(dir, prefix)?;
        let mut stats = WalStats {
            total_files: files.len(),
            ..Default::default()
        };

        for path in &files {
            let meta = fs::metadata(path)?;
            stats.total_size_bytes += meta.len();

            let file = File::open(path)?;
            let mut reader = BufReader::new(file);
            let mut line = String::new();
            let mut count = 0u64;

            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let entry: WalEntry = match serde_json::from_str(trimmed) {
                    Ok(e) => e,
                    Err(_) => break,
                };
                count += 1;
                stats.first_sequence = Some(match stats.first_sequence {
                    Some(existing) => existing.min(entry.sequence),
                    None => entry.sequence,
                });
                stats.last_sequence = Some(match stats.last_sequence {
                    Some(existing) => existing.max(entry.sequence),
                    None => entry.sequence,
                });
            }

            stats.entries_per_file.push((path.clone(), count));
        }

        Ok(stats)
    }

    /// Whether the active file is close to triggering rotation and whether
    /// any sealed file is old enough to warrant a cleanup pass.
    pub fn health(&self, config: &WalConfig, now: DateTime<Utc>) -> Result<WalHealth, WalError> {
        let active_meta = fs::metadata(self.active_path())?;
        let rotation_due =
            active_meta.len() as f64 >= 0.9 * config.max_file_size as f64;

        let files = list_for_stats(self.dir(), &config.prefix)?;
        let mut oldest_age_days = None;
        for path in files.iter().take(files.len().saturating_sub(1)) {
            let meta = fs::metadata(path)?;
            let modified: DateTime<Utc> = meta.modified()?.into();
            let age_days = (now - modified).num_seconds() as f64 / 86_400.0;
            oldest_age_days = Some(match oldest_age_days {
                Some(existing) if existing >= age_days => existing,
                _ => age_days,
            });
        }

        let cleanup_due = oldest_age_days
            .map(|age| age >= config.retention_days as f64)
            .unwrap_or(false);

        Ok(WalHealth {
            rotation_due,
            cleanup_due,
            oldest_file_age_days: oldest_age_days,
        })
    }
}

fn list_for_stats(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, WalError> {
    list_wal_files(dir, prefix)
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
