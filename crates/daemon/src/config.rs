// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process configuration: where state lives on disk and the knobs that
//! control one reconciliation cycle. Resolved the way the rest of this
//! stack's daemons resolve theirs: fixed paths under an XDG state
//! directory, overridable by an optional `config.toml` in that directory.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::DaemonError;

/// One cloud account to reconcile against. Only `kind = "noop"` is wired
/// up without a real cloud SDK; real provider plugins are out of scope
/// here and are expected to register themselves into the same
/// `recon_providers::ProviderMap` the daemon builds at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub region: String,
    #[serde(default = "default_provider_kind")]
    pub kind: String,
}

fn default_provider_kind() -> String {
    "noop".to_string()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub wal_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub log_path: PathBuf,
    pub lock_path: PathBuf,
    pub scan_interval: Duration,
    pub business_hours_tz: chrono_tz::Tz,
    pub allow_destructive: bool,
    pub allow_blessed_changes: bool,
    pub skip_confirmation: bool,
    pub providers: Vec<ProviderConfig>,
}

/// The subset of [`Config`] a `config.toml` may override. Anything absent
/// keeps the built-in default.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    scan_interval_secs: Option<u64>,
    business_hours_timezone: Option<String>,
    allow_destructive: Option<bool>,
    allow_blessed_changes: Option<bool>,
    skip_confirmation: Option<bool>,
    #[serde(default)]
    providers: Vec<ProviderConfig>,
}

impl Config {
    /// Resolves the state directory (`RECONCILED_STATE_DIR` >
    /// `$XDG_STATE_HOME/reconciled` > `~/.local/state/reconciled`), derives
    /// the fixed paths under it, then overlays `config.toml` if present.
    pub fn load() -> Result<Self, DaemonError> {
        let state_dir = state_dir()?;

        let mut config = Self {
            wal_dir: state_dir.join("wal"),
            snapshot_path: state_dir.join("snapshot.json"),
            log_path: state_dir.join("reconciled.log"),
            lock_path: state_dir.join("reconciled.pid"),
            scan_interval: Duration::from_secs(60),
            business_hours_tz: chrono_tz::UTC,
            allow_destructive: false,
            allow_blessed_changes: false,
            skip_confirmation: false,
            providers: Vec::new(),
            state_dir,
        };

        let config_path = config.state_dir.join("config.toml");
        if config_path.exists() {
            let raw = std::fs::read_to_string(&config_path)?;
            let file_config: FileConfig = toml::from_str(&raw)?;
            config.apply(file_config)?;
        }

        Ok(config)
    }

    fn apply(&mut self, overrides: FileConfig) -> Result<(), DaemonError> {
        if let Some(secs) = overrides.scan_interval_secs {
            self.scan_interval = Duration::from_secs(secs);
        }
        if let Some(tz) = overrides.business_hours_timezone {
            self.business_hours_tz = chrono_tz::Tz::from_str(&tz).map_err(|_| DaemonError::InvalidTimezone(tz))?;
        }
        if let Some(allow_destructive) = overrides.allow_destructive {
            self.allow_destructive = allow_destructive;
        }
        if let Some(allow_blessed_changes) = overrides.allow_blessed_changes {
            self.allow_blessed_changes = allow_blessed_changes;
        }
        if let Some(skip_confirmation) = overrides.skip_confirmation {
            self.skip_confirmation = skip_confirmation;
        }
        if !overrides.providers.is_empty() {
            self.providers = overrides.providers;
        }
        Ok(())
    }
}

fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("RECONCILED_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = std::env::var_os("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("reconciled"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/reconciled"))
        .ok_or(DaemonError::NoStateDir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
