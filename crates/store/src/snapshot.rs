// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery.
//!
//! A snapshot stores the complete materialized state as of a WAL sequence
//! number. Recovery loads the snapshot and replays WAL entries after it.

use crate::migration::{MigrationError, MigrationRegistry, CURRENT_SNAPSHOT_VERSION};
use crate::state::MaterializedState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState) -> Self {
        Self {
            version: CURRENT_SNAPSHOT_VERSION,
            seq,
            state,
            created_at: Utc::now(),
        }
    }

    /// Save uncompressed, atomically (write to `.tmp`, fsync, rename).
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load if present. Returns `Ok(None)` if absent or corrupt; corrupt
    /// files are moved to `.bak` so the caller can fall back to WAL replay.
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let value: Result<serde_json::Value, _> = serde_json::from_reader(reader);

        let value = match value {
            Ok(v) => v,
            Err(e) => {
                rotate_to_bak(path, &e.to_string())?;
                return Ok(None);
            }
        };

        let registry = MigrationRegistry::new();
        let migrated = match registry.migrate_to(value, CURRENT_SNAPSHOT_VERSION) {
            Ok(v) => v,
            Err(e) => {
                rotate_to_bak(path, &e.to_string())?;
                return Ok(None);
            }
        };

        match serde_json::from_value(migrated) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                rotate_to_bak(path, &e.to_string())?;
                Ok(None)
            }
        }
    }
}

fn rotate_to_bak(path: &Path, reason: &str) -> Result<(), SnapshotError> {
    let bak_path = rotate_bak_path(path);
    warn!(
        error = reason,
        path = %path.display(),
        bak = %bak_path.display(),
        "corrupt snapshot, moving to .bak and starting fresh",
    );
    fs::rename(path, &bak_path)?;
    Ok(())
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
