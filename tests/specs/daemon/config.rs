//! `config.toml` overlay behavior.

use crate::prelude::*;

#[test]
fn unsupported_provider_kind_fails_startup() {
    let harness = Harness::new();
    harness.write_config(
        r#"
[[providers]]
name = "aws"
region = "us-east-1"
kind = "ec2-sdk"
"#,
    );

    let output = harness.run(&[]);
    output.assert_failure();
    assert!(output.stderr_string().contains("UnsupportedProviderKind"));
}

#[test]
fn invalid_business_hours_timezone_fails_startup() {
    let harness = Harness::new();
    harness.write_config(
        r#"
business_hours_timezone = "Not/A_Real_Zone"
"#,
    );

    let output = harness.run(&[]);
    output.assert_failure();
    assert!(output.stderr_string().contains("InvalidTimezone"));
}

#[test]
fn malformed_config_toml_fails_startup() {
    let harness = Harness::new();
    harness.write_config("this is not valid toml {{{");

    let output = harness.run(&[]);
    output.assert_failure();
}

#[test]
fn absent_config_toml_runs_with_defaults() {
    let mut harness = Harness::new();
    harness.spawn();

    let ready = wait_for(SPEC_WAIT_MAX_MS, || harness.lock_path().exists());
    assert!(ready, "daemon should start fine with no config.toml present");

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS));
}
