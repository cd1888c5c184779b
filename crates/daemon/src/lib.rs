// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! reconciled's process-level glue: configuration, logging, and the
//! collaborator wiring the `reconciled` binary assembles at startup.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod error;
mod logging;
pub mod wiring;

pub use config::{Config, ProviderConfig};
pub use error::DaemonError;
pub use logging::setup_logging;
pub use wiring::{NoopPolicyEngine, Wiring};
