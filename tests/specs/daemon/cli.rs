//! CLI surface: info flags and invalid arguments.

use crate::prelude::*;

#[test]
fn version_flag_prints_the_crate_version() {
    let harness = Harness::new();
    let output = harness.run(&["--version"]);
    output.assert_success();
    // recon-specs and recon-daemon share `workspace.package.version`.
    assert_output_eq(&output.stdout_string(), &format!("reconciled {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_flag_prints_usage() {
    let harness = Harness::new();
    let output = harness.run(&["--help"]);
    output.assert_success();
    let stdout = output.stdout_string();
    assert!(stdout.contains("USAGE"));
    assert!(stdout.contains("reconciled"));
}

#[test]
fn unexpected_argument_fails_with_usage_hint() {
    let harness = Harness::new();
    let output = harness.run(&["--bogus"]);
    output.assert_failure();
    assert!(output.stderr_string().contains("unexpected argument"));
}
