//! Process lifecycle: startup, state-file creation, lock contention, and
//! graceful shutdown.

use crate::prelude::*;

fn fast_noop_config() -> &'static str {
    r#"
scan_interval_secs = 1
skip_confirmation = true

[[providers]]
name = "aws"
region = "us-east-1"
kind = "noop"
"#
}

#[test]
fn startup_creates_lock_and_log_files() {
    let mut harness = Harness::new();
    harness.write_config(fast_noop_config());
    harness.spawn();

    let ready = wait_for(SPEC_WAIT_MAX_MS, || {
        harness.lock_path().exists() && !harness.log_contents().contains("(no log file)")
    });
    assert!(ready, "expected lock and log files to appear\nlog: {}", harness.log_contents());

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS), "process should exit after SIGTERM");
}

#[test]
fn runs_at_least_one_reconciliation_cycle() {
    let mut harness = Harness::new();
    harness.write_config(fast_noop_config());
    harness.spawn();

    let cycled = wait_for(SPEC_WAIT_MAX_MS, || {
        harness.log_contents().contains("reconciliation cycle finished")
    });
    assert!(cycled, "expected at least one cycle log line\nlog: {}", harness.log_contents());

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS));
}

#[test]
fn sigterm_shuts_down_cleanly_and_removes_the_lock_file() {
    let mut harness = Harness::new();
    harness.write_config(fast_noop_config());
    harness.spawn();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || harness.lock_path().exists()));

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS), "process should exit after SIGTERM");

    assert!(!harness.lock_path().exists(), "lock file should be removed on clean shutdown");
}

#[test]
fn sigterm_writes_a_final_snapshot() {
    let mut harness = Harness::new();
    harness.write_config(fast_noop_config());
    harness.spawn();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        harness.log_contents().contains("reconciliation cycle finished")
    }));

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS));

    assert!(harness.snapshot_path().exists(), "final checkpoint should be written on shutdown");

    // The checkpoint is zstd-compressed JSON; a parseable `seq` field
    // confirms the daemon wrote a real checkpoint, not an empty file.
    let file = std::fs::File::open(harness.snapshot_path()).expect("open snapshot");
    let decoder = zstd::stream::read::Decoder::new(file).expect("zstd decoder");
    let value: serde_json::Value = serde_json::from_reader(decoder).expect("snapshot is valid JSON");
    assert!(value.get("seq").is_some(), "snapshot should carry a seq field: {value:?}");
}

#[test]
fn a_second_instance_refuses_to_start_while_one_is_running() {
    let mut harness = Harness::new();
    harness.write_config(fast_noop_config());
    harness.spawn();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || harness.lock_path().exists()));

    let second = harness.run(&[]);
    second.assert_failure();
    assert!(second.stderr_string().contains("already running"));

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS));
}

#[test]
fn a_new_instance_starts_after_the_previous_one_exits() {
    let mut harness = Harness::new();
    harness.write_config(fast_noop_config());
    harness.spawn();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || harness.lock_path().exists()));
    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS));

    harness.spawn();
    assert!(wait_for(SPEC_WAIT_MAX_MS, || harness.lock_path().exists()));

    harness.terminate();
    assert!(harness.wait_for_exit(SPEC_WAIT_MAX_MS));
}
