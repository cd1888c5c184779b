// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to parse config.toml: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    #[error("invalid timezone in config: {0}")]
    InvalidTimezone(String),

    #[error("WAL error: {0}")]
    Wal(#[from] recon_wal::WalError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] recon_store::SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported provider kind: {0}")]
    UnsupportedProviderKind(String),
}
