//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};

use assert_cmd::Command as AssertCommand;

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 3000;

/// Locates a binary built alongside the test harness, the way the test
/// binary's own directory is used to find sibling binaries in a
/// `cargo test` run.
fn binary_path(name: &str) -> PathBuf {
    let mut path = std::env::current_exe().expect("current test executable path");
    path.pop(); // deps/
    path.pop(); // debug/ (or target profile dir)
    path.push(name);
    path
}

fn reconciled_binary() -> PathBuf {
    binary_path("reconciled")
}

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// An isolated state directory plus a running (or not-yet-started)
/// `reconciled` process against it.
pub struct Harness {
    state_dir: tempfile::TempDir,
    child: Option<Child>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            state_dir: tempfile::tempdir().expect("tempdir"),
            child: None,
        }
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.state_path().join("config.toml"), toml).expect("write config.toml");
    }

    fn assert_command(&self) -> AssertCommand {
        let mut cmd = AssertCommand::new(reconciled_binary());
        cmd.env("RECONCILED_STATE_DIR", self.state_path());
        cmd.env_remove("XDG_STATE_HOME");
        cmd
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(reconciled_binary());
        cmd.env("RECONCILED_STATE_DIR", self.state_path());
        cmd.env_remove("XDG_STATE_HOME");
        cmd
    }

    /// Run `reconciled` to completion (for `--version`/`--help`/error paths).
    pub fn run(&self, args: &[&str]) -> Output {
        self.assert_command().args(args).output().expect("reconciled should run")
    }

    /// Build an [`assert_cmd::Command`] for callers that want its fluent
    /// `.assert().success()`/`.failure()` predicates directly.
    pub fn assert_cmd(&self, args: &[&str]) -> AssertCommand {
        let mut cmd = self.assert_command();
        cmd.args(args);
        cmd
    }

    /// Spawn `reconciled` as a background process, storing the handle so
    /// `stop` or `Drop` can clean it up.
    pub fn spawn(&mut self) {
        let child = self.command().spawn().expect("reconciled should spawn");
        self.child = Some(child);
    }

    /// Send SIGTERM to the running process, matching how an operator or a
    /// process supervisor would ask it to shut down.
    pub fn terminate(&self) {
        if let Some(child) = &self.child {
            let _ = Command::new("kill")
                .args(["-TERM", &child.id().to_string()])
                .status();
        }
    }

    pub fn wait_for_exit(&mut self, timeout_ms: u64) -> bool {
        let Some(mut child) = self.child.take() else {
            return true;
        };
        let exited = wait_for(timeout_ms, || {
            matches!(child.try_wait(), Ok(Some(_)))
        });
        if !exited {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.child = None;
        exited
    }

    pub fn log_contents(&self) -> String {
        std::fs::read_to_string(self.state_path().join("reconciled.log"))
            .unwrap_or_else(|_| "(no log file)".to_string())
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_path().join("reconciled.pid")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_path().join("snapshot.json")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

pub trait OutputAssertions {
    fn assert_success(&self) -> &Self;
    fn assert_failure(&self) -> &Self;
    fn stdout_string(&self) -> String;
    fn stderr_string(&self) -> String;
}

impl OutputAssertions for Output {
    fn assert_success(&self) -> &Self {
        assert!(
            self.status.success(),
            "expected success, got exit code {:?}\nstderr: {}",
            self.status.code(),
            self.stderr_string()
        );
        self
    }

    fn assert_failure(&self) -> &Self {
        assert!(!self.status.success(), "expected failure, but the process exited successfully");
        self
    }

    fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Asserts exact string equality with a readable diff on mismatch, the
/// way output comparisons are done across this stack's test suites.
pub fn assert_output_eq(actual: &str, expected: &str) {
    similar_asserts::assert_eq!(actual, expected);
}
