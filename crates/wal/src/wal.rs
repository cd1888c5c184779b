// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL audit write-ahead log with group commit and size-based rotation.
//!
//! Entries are durably stored before a decision is acted on, enabling
//! recovery via replay from the last checkpoint. Group commit batches
//! writes for a short interval so callers are not forced to fsync on
//! every single entry.
//!
//! Each line is one JSON object: `{"timestamp":...,"sequence":N,"type":...}\n`

use crate::config::WalConfig;
use recon_core::WalEntry;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt entry at offset {offset}: {message}")]
    Corrupt { offset: u64, message: String },
    #[error("replay handler failed: {0}")]
    Handler(String),
}

/// Append-only, totally ordered log of [`WalEntry`] records.
///
/// The WAL owns exactly one active file handle and write buffer at a time.
/// Rotation opens a new file and leaves the old one sealed on disk; sequence
/// numbers continue monotonically across the rotation.
pub struct Wal {
    dir: PathBuf,
    config: WalConfig,
    file: File,
    read_file: File,
    active_path: PathBuf,
    active_size: u64,
    write_seq: u64,
    write_buffer: Vec<Vec<u8>>,
    last_flush: Instant,
}

impl Wal {
    /// Open (creating if absent) the WAL directory, recovering the maximum
    /// sequence number seen across all files so new appends resume at
    /// `max + 1`.
    pub fn open(dir: &Path, config: WalConfig) -> Result<Self, WalError> {
        fs::create_dir_all(dir)?;

        let mut files = list_wal_files(dir, &config.prefix)?;
        let mut write_seq = 0u64;
        for sealed in files.iter().take(files.len().saturating_sub(1)) {
            let file = File::open(sealed)?;
            let (seq, _corrupt) = scan_max_seq(&file)?;
            write_seq = write_seq.max(seq);
        }

        let active_path = match files.last() {
            Some(p) => p.clone(),
            None => {
                let p = new_file_path(dir, &config.prefix);
                files.push(p.clone());
                p
            }
        };

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&active_path)?;

        let (mut active_seq, corrupt) = scan_max_seq(&file)?;

        if corrupt {
            let valid_lines = read_valid_lines(&file)?;
            drop(file);

            let bak_path = rotate_bak_path(&active_path);
            warn!(
                path = %active_path.display(),
                bak = %bak_path.display(),
                valid_entries = valid_lines.len(),
                "corrupt WAL file detected, rotating to .bak and preserving valid entries",
            );
            fs::rename(&active_path, &bak_path)?;

            {
                let mut new_file = File::create(&active_path)?;
                for line in &valid_lines {
                    new_file.write_all(line.as_bytes())?;
                    new_file.write_all(b"\n")?;
                }
                new_file.sync_all()?;
            }

            file = OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(&active_path)?;
            let (seq, _) = scan_max_seq(&file)?;
            active_seq = seq;
        }

        write_seq = write_seq.max(active_seq);

        let read_file = file.try_clone()?;
        let active_size = file.metadata()?.len();

        Ok(Self {
            dir: dir.to_owned(),
            config,
            file,
            read_file,
            active_path,
            active_size,
            write_seq,
            write_buffer: Vec::new(),
            last_flush: Instant::now(),
        })
    }

    /// Buffer an entry for append, assigning the next sequence number.
    ///
    /// The entry is not durable until [`Wal::flush`] returns successfully.
    pub fn append(
        &mut self,
        entry_type: recon_core::WalEntryType,
        resource_id: Option<String>,
        payload: serde_json::Value,
    ) -> Result<u64, WalError> {
        self.append_entry(entry_type, resource_id, payload, None)
    }

    /// Like [`Wal::append`], recording a non-empty `error` field.
    pub fn append_error(
        &mut self,
        entry_type: recon_core::WalEntryType,
        resource_id: Option<String>,
        payload: serde_json::Value,
        error: String,
    ) -> Result<u64, WalError> {
        self.append_entry(entry_type, resource_id, payload, Some(error))
    }

    fn append_entry(
        &mut self,
        entry_type: recon_core::WalEntryType,
        resource_id: Option<String>,
        payload: serde_json::Value,
        error: Option<String>,
    ) -> Result<u64, WalError> {
        self.rotate_if_needed()?;

        let seq = self.write_seq + 1;
        let entry = WalEntry {
            timestamp: chrono::Utc::now(),
            sequence: seq,
            entry_type,
            resource_id,
            payload,
            error,
        };
        let mut json_bytes = serde_json::to_vec(&entry)?;
        json_bytes.push(b'\n');
        self.active_size += json_bytes.len() as u64;
        self.write_buffer.push(json_bytes);
        self.write_seq = seq;
        Ok(seq)
    }

    fn rotate_if_needed(&mut self) -> Result<(), WalError> {
        if self.active_size < self.config.max_file_size {
            return Ok(());
        }
        self.flush()?;

        let new_path = new_file_path(&self.dir, &self.config.prefix);
        let new_file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&new_path)?;

        info!(
            sealed = %self.active_path.display(),
            next = %new_path.display(),
            sequence = self.write_seq,
            "rotating WAL file",
        );

        self.read_file = new_file.try_clone()?;
        self.file = new_file;
        self.active_path = new_path;
        self.active_size = 0;
        Ok(())
    }

    /// True once group commit should flush: buffer non-empty and either the
    /// flush interval elapsed or the entry threshold was reached.
    pub fn needs_flush(&self) -> bool {
        !self.write_buffer.is_empty()
            && (self.last_flush.elapsed() >= self.config.flush_interval
                || self.write_buffer.len() >= self.config.flush_threshold)
    }

    /// Write all buffered entries and fsync. After this returns
    /// successfully every buffered entry is durable and visible to replay.
    pub fn flush(&mut self) -> Result<(), WalError> {
        if self.write_buffer.is_empty() {
            return Ok(());
        }
        for bytes in self.write_buffer.drain(..) {
            self.file.write_all(&bytes)?;
        }
        self.file.sync_all()?;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Sequence number of the most recently appended (not necessarily
    /// flushed) entry.
    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// Directory this WAL is rooted at.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file currently accepting writes.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Iterate all entries across every file in the directory, in file and
    /// then append order, invoking `handler` for each entry whose timestamp
    /// is strictly after `since`. Corrupt or partial lines are skipped, not
    /// treated as a stopping point, since only the tail of the active file
    /// can be interrupted mid-write.
    pub fn replay<F>(
        dir: &Path,
        prefix: &str,
        since: chrono::DateTime<chrono::Utc>,
        mut handler: F,
    ) -> Result<(), WalError>
    where
        F: FnMut(&WalEntry) -> Result<(), WalError>,
    {
        for path in list_wal_files(dir, prefix)? {
            let file = File::open(&path)?;
            let mut reader = BufReader::new(file);
            let mut line = String::new();
            let mut offset = 0u64;

            loop {
                line.clear();
                let bytes_read = match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
                    Err(e) => return Err(e.into()),
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    offset += bytes_read as u64;
                    continue;
                }

                let entry: WalEntry = match serde_json::from_str(trimmed) {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            offset,
                            error = %e,
                            "skipping unreadable WAL entry during replay",
                        );
                        offset += bytes_read as u64;
                        continue;
                    }
                };
                offset += bytes_read as u64;

                if entry.timestamp > since {
                    handler(&entry).map_err(|e| WalError::Handler(e.to_string()))?;
                }
            }
        }
        Ok(())
    }
}

/// Files named `{prefix}-{timestamp}.wal`, sorted ascending (oldest first).
/// The fixed-width timestamp format makes lexical order equal chronological
/// order, so the last entry is always the newest (and, if a `Wal` is open
/// against this directory, the active) file.
pub(crate) fn list_wal_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, WalError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let want_prefix = format!("{prefix}-");
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("wal")
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(&want_prefix))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn new_file_path(dir: &Path, prefix: &str) -> PathBuf {
    let ts = chrono::Utc::now().format("%Y%m%dT%H%M%S%9f");
    dir.join(format!("{prefix}-{ts}.wal"))
}

/// Scan a file start to finish, returning `(max_sequence, corrupt)` where
/// `corrupt` is true if a parse error (not plain EOF) was hit.
fn scan_max_seq(file: &File) -> Result<(u64, bool), WalError> {
    let mut reader = BufReader::new(file.try_clone()?);
    reader.seek(SeekFrom::Start(0))?;

    let mut max_seq = 0u64;
    let mut corrupt = false;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                corrupt = true;
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let entry: WalEntry = match serde_json::from_str(trimmed) {
            Ok(e) => e,
            Err(_) => {
                corrupt = true;
                break;
            }
        };
        max_seq = max_seq.max(entry.sequence);
    }

    Ok((max_seq, corrupt))
}

fn read_valid_lines(file: &File) -> Result<Vec<String>, WalError> {
    let mut reader = BufReader::new(file.try_clone()?);
    reader.seek(SeekFrom::Start(0))?;

    let mut valid = Vec::new();
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
            Err(e) => return Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _: WalEntry = match serde_json::from_str(trimmed) {
            Ok(e) => e,
            Err(_) => break,
        };
        valid.push(trimmed.to_string());
    }

    Ok(valid)
}

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
fn rotate_bak_path(path: &Path) -> PathBuf {
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
#[path = "wal_tests.rs"]
mod tests;
