// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Versioned observation history for scanned cloud resources: batch
//! recording, change-event derivation, snapshot/checkpoint durability, and
//! schema migration for the snapshot format.

mod checkpoint;
mod migration;
mod snapshot;
mod state;
mod store;

pub use checkpoint::{
    CheckpointError, CheckpointHandle, CheckpointResult, CheckpointWriter, Checkpointer,
    FsCheckpointWriter, load_snapshot,
};
pub use migration::{Migration, MigrationError, MigrationRegistry, CURRENT_SNAPSHOT_VERSION};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::MaterializedState;
pub use store::{ObservationStore, StoreError};
