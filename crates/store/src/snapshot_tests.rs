// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use recon_core::{Observation, Resource};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

fn sample_state() -> MaterializedState {
    let mut state = MaterializedState::default();
    let resource = Resource {
        id: "i-1".into(),
        provider: "aws".to_string(),
        region: "us-east-1".to_string(),
        account: "111111111111".to_string(),
        resource_type: "ec2".to_string(),
        name: "web".to_string(),
        status: "running".to_string(),
        tags: BTreeMap::new(),
        attrs: BTreeMap::new(),
        observed_at: Utc::now(),
    };
    let identity = resource.identity();
    state.push(
        &identity,
        Observation {
            observed_at: resource.observed_at,
            sequence: 1,
            disappeared: false,
            resource,
        },
    );
    state
}

#[test]
fn save_and_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let snapshot = Snapshot::new(7, sample_state());
    snapshot.save(&path).unwrap();

    let loaded = Snapshot::load(&path).unwrap().unwrap();
    assert_eq!(loaded.seq, 7);
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
}

#[test]
fn load_nonexistent_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    assert!(Snapshot::load(&path).unwrap().is_none());
}

#[test]
fn save_does_not_leave_tmp_file_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    Snapshot::new(1, sample_state()).save(&path).unwrap();
    assert!(!path.with_extension("tmp").exists());
    assert!(path.exists());
}

#[test]
fn corrupt_snapshot_is_rotated_to_bak_and_load_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, b"not json at all").unwrap();

    let loaded = Snapshot::load(&path).unwrap();
    assert!(loaded.is_none());
    assert!(!path.exists());
    assert!(path.with_extension("bak").exists());
}

#[test]
fn repeated_corruption_rotates_through_numbered_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    for _ in 0..4 {
        fs::write(&path, b"garbage").unwrap();
        assert!(Snapshot::load(&path).unwrap().is_none());
    }

    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
}

#[test]
fn version_too_new_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, r#"{"v":99,"seq":1,"state":{"history":{}},"created_at":"2026-01-01T00:00:00Z"}"#).unwrap();

    let loaded = Snapshot::load(&path).unwrap();
    assert!(loaded.is_none());
    assert!(path.with_extension("bak").exists());
}
