// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::time::Duration;

fn clear_env() {
    std::env::remove_var("RECONCILED_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
#[serial]
fn load_resolves_state_dir_from_override_env_var() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("RECONCILED_STATE_DIR", dir.path());

    let config = Config::load().unwrap();

    assert_eq!(config.state_dir, dir.path());
    assert_eq!(config.wal_dir, dir.path().join("wal"));
    assert_eq!(config.scan_interval, Duration::from_secs(60));
    clear_env();
}

#[test]
#[serial]
fn load_applies_config_toml_overrides() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("RECONCILED_STATE_DIR", dir.path());
    std::fs::write(
        dir.path().join("config.toml"),
        r#"
            scan_interval_secs = 30
            business_hours_timezone = "America/New_York"
            allow_destructive = true

            [[providers]]
            name = "aws"
            region = "us-east-1"
        "#,
    )
    .unwrap();

    let config = Config::load().unwrap();

    assert_eq!(config.scan_interval, Duration::from_secs(30));
    assert_eq!(config.business_hours_tz, chrono_tz::America::New_York);
    assert!(config.allow_destructive);
    assert_eq!(config.providers.len(), 1);
    assert_eq!(config.providers[0].name, "aws");
    assert_eq!(config.providers[0].kind, "noop");
    clear_env();
}

#[test]
#[serial]
fn load_rejects_unknown_timezone_name() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("RECONCILED_STATE_DIR", dir.path());
    std::fs::write(dir.path().join("config.toml"), r#"business_hours_timezone = "Not/AZone""#).unwrap();

    let result = Config::load();

    assert!(result.is_err());
    clear_env();
}
