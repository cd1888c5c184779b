// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error-kind tagging used across crate boundaries.
//!
//! Each crate (`recon-wal`, `recon-store`, `recon-executor`, ...) defines
//! its own `thiserror` error enum for its own operations; this module only
//! holds the abstract taxonomy from the design doc so downstream crates can
//! classify errors uniformly (e.g. for retry policy or user-facing messages)
//! without depending on every other crate's concrete error type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    ResourceNotFound,
    ProviderError,
    SafetyBlocked,
    BlessedProtected,
    ConfirmationDeclined,
    ConfirmationUnavailable,
    DurabilityError,
    StorageError,
    CancelledOrTimedOut,
}
