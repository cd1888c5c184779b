// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The human (or automated) gate destructive and blessed-resource
//! decisions pass through before the executor acts.

use async_trait::async_trait;
use recon_core::Decision;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone)]
pub struct ConfirmationRequest<'a> {
    pub decision: &'a Decision,
    pub message: String,
    pub severity: Severity,
    pub default_no: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ConfirmationResponse {
    pub approved: bool,
    pub message: Option<String>,
    /// If set, the caller may remember this answer for identical future
    /// requests without asking again. The executor never reads this
    /// itself; it is forwarded for the orchestrator/CLI layer to use.
    pub remember: bool,
}

#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn request_confirmation(&self, request: ConfirmationRequest<'_>) -> ConfirmationResponse;
}

/// Approves or declines every request, for tests.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeConfirmer {
    responses: parking_lot::Mutex<Vec<bool>>,
    calls: parking_lot::Mutex<usize>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeConfirmer {
    /// `responses` is consumed front-to-back, one per `request_confirmation`
    /// call; once exhausted, further calls approve.
    pub fn new(responses: Vec<bool>) -> Self {
        Self {
            responses: parking_lot::Mutex::new(responses),
            calls: parking_lot::Mutex::new(0),
        }
    }

    pub fn always_approve() -> Self {
        Self::new(Vec::new())
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Confirmer for FakeConfirmer {
    async fn request_confirmation(&self, _request: ConfirmationRequest<'_>) -> ConfirmationResponse {
        *self.calls.lock() += 1;
        let approved = if self.responses.lock().is_empty() {
            true
        } else {
            self.responses.lock().remove(0)
        };
        ConfirmationResponse {
            approved,
            message: None,
            remember: false,
        }
    }
}

#[cfg(test)]
#[path = "confirmer_tests.rs"]
mod tests;
