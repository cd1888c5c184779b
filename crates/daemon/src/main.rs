// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reconciled
//!
//! Background process that periodically scans configured cloud providers,
//! evaluates policy against what it finds, and enforces non-ignore
//! decisions through the executor.

use std::io::Write;

use fs2::FileExt;
use recon_core::{Observation, Resource};
use recon_daemon::{setup_logging, wiring, Config, DaemonError};
use recon_store::{load_snapshot, Checkpointer, MaterializedState};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("reconciled {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("reconciled {}", env!("CARGO_PKG_VERSION"));
                println!("Continuous infrastructure reconciliation daemon");
                println!();
                println!("USAGE:");
                println!("    reconciled");
                println!();
                println!("Runs until sent SIGTERM or SIGINT, periodically scanning the");
                println!("providers configured in $RECONCILED_STATE_DIR/config.toml.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: reconciled [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        eprintln!("reconciled is already running (lock held at {})", config.lock_path.display());
        std::process::exit(1);
    }
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let _lock_file = lock_file;

    if let Err(e) = run(&config).await {
        // The lock file is ours (we just acquired it above); a failed
        // startup or run must not leave it behind for the next attempt.
        let _ = std::fs::remove_file(&config.lock_path);
        return Err(e.into());
    }

    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }

    Ok(())
}

async fn run(config: &Config) -> Result<(), DaemonError> {
    let _log_guard = setup_logging(config)?;
    info!("starting reconciled");

    let restored_state = match load_snapshot(&config.snapshot_path)? {
        Some(snapshot) => {
            info!(seq = snapshot.seq, "restored snapshot");
            snapshot.state
        }
        None => MaterializedState::default(),
    };
    let initial_resources = current_resources(&restored_state);

    let wiring = wiring::build(config, initial_resources)?;

    let cancellation = CancellationToken::new();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let signal_cancellation = cancellation.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
        signal_cancellation.cancel();
    });

    let orchestrator = wiring.orchestrator.clone();
    let loop_cancellation = cancellation.clone();
    let scan_interval = config.scan_interval;
    let loop_handle = tokio::spawn(async move {
        orchestrator.run_periodic(scan_interval, loop_cancellation).await;
    });

    cancellation.cancelled().await;
    if let Err(e) = loop_handle.await {
        error!(error = %e, "reconciliation loop task panicked");
    }

    let (state, seq) = wiring.store.snapshot_state();
    let checkpointer = Checkpointer::new(config.snapshot_path.clone());
    match checkpointer.checkpoint_sync(seq, &state) {
        Ok(result) => info!(seq = result.seq, bytes = result.size_bytes, "final checkpoint saved"),
        Err(e) => warn!(error = %e, "final checkpoint failed"),
    }
    if let Err(e) = wiring.wal.lock().flush() {
        warn!(error = %e, "final WAL flush failed");
    }

    info!("reconciled shut down cleanly");
    Ok(())
}

/// Flatten a restored snapshot into the current, present resources it
/// implies, the way a cold start re-seeds the store before the first scan.
fn current_resources(state: &MaterializedState) -> Vec<Resource> {
    state
        .all_histories()
        .filter_map(|history| history.last())
        .filter(|observation: &&Observation| !observation.disappeared)
        .map(|observation| observation.resource.clone())
        .collect()
}
