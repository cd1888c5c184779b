// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Cloud provider abstraction: the `Provider` trait the executor and
//! scanners call through, test doubles, and an immutable name → provider
//! registry built once at startup.

mod noop;
mod provider;
mod registry;

pub use noop::NoopProvider;
pub use provider::{Provider, ProviderError, ResourceFilter, ResourceSpec};
pub use registry::{ProviderMap, ProviderMapBuilder, ProviderMapError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProvider, ProviderCall};
