// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

struct V1ToV2;

impl Migration for V1ToV2 {
    fn source_version(&self) -> u32 {
        1
    }

    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError> {
        if let Some(obj) = snapshot.as_object_mut() {
            obj.insert("extra".into(), json!("added-by-migration"));
        }
        Ok(())
    }
}

struct AlwaysFails;

impl Migration for AlwaysFails {
    fn source_version(&self) -> u32 {
        1
    }

    fn target_version(&self) -> u32 {
        2
    }

    fn migrate(&self, _snapshot: &mut Value) -> Result<(), MigrationError> {
        Err(MigrationError::Failed {
            from: 1,
            to: 2,
            reason: "boom".into(),
        })
    }
}

#[test]
fn snapshot_already_at_target_version_is_returned_unchanged() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 1, "seq": 42});
    let migrated = registry.migrate_to(snapshot.clone(), 1).unwrap();
    assert_eq!(migrated, snapshot);
}

#[test]
fn snapshot_newer_than_target_is_rejected() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 5, "seq": 1});
    let err = registry.migrate_to(snapshot, 1).unwrap_err();
    assert!(matches!(err, MigrationError::TooNew(5, 1)));
}

#[test]
fn missing_version_field_defaults_to_one() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"seq": 1});
    let migrated = registry.migrate_to(snapshot, 1).unwrap();
    assert_eq!(migrated["seq"], 1);
}

#[test]
fn no_registered_path_is_an_error() {
    let registry = MigrationRegistry::new();
    let snapshot = json!({"v": 1, "seq": 1});
    let err = registry.migrate_to(snapshot, 2).unwrap_err();
    assert!(matches!(err, MigrationError::NoPath(1, 2)));
}

#[test]
fn registered_migration_runs_and_bumps_version() {
    let registry = MigrationRegistry {
        migrations: vec![Box::new(V1ToV2)],
    };
    let snapshot = json!({"v": 1, "seq": 1});
    let migrated = registry.migrate_to(snapshot, 2).unwrap();
    assert_eq!(migrated["v"], 2);
    assert_eq!(migrated["extra"], "added-by-migration");
}

#[test]
fn failing_migration_propagates_error() {
    let registry = MigrationRegistry {
        migrations: vec![Box::new(AlwaysFails)],
    };
    let snapshot = json!({"v": 1, "seq": 1});
    let err = registry.migrate_to(snapshot, 2).unwrap_err();
    assert!(matches!(err, MigrationError::Failed { .. }));
}
