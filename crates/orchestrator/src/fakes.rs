// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Scanner`/`PolicyEngine` doubles for exercising the
//! orchestrator without a real cloud account or policy runtime.

use crate::traits::{CycleContext, PolicyDecision, PolicyEngine, PolicyError, PolicyInput, ScanError, Scanner};
use async_trait::async_trait;
use parking_lot::Mutex;
use recon_core::Resource;
use std::collections::BTreeMap;

/// Returns a fixed resource list on every scan, or a configured error.
pub struct FakeScanner {
    resources: Mutex<Vec<Resource>>,
    error: Mutex<Option<String>>,
    calls: Mutex<usize>,
}

impl FakeScanner {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources: Mutex::new(resources),
            error: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub fn set_error(&self, message: impl Into<String>) {
        *self.error.lock() = Some(message.into());
    }

    pub fn set_resources(&self, resources: Vec<Resource>) {
        *self.resources.lock() = resources;
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Scanner for FakeScanner {
    async fn scan(&self, ctx: &CycleContext) -> Result<Vec<Resource>, ScanError> {
        *self.calls.lock() += 1;
        if ctx.cancellation.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        if let Some(message) = self.error.lock().clone() {
            return Err(ScanError::Failed(message));
        }
        Ok(self.resources.lock().clone())
    }
}

/// Evaluates policy by looking up the resource id in a fixed table,
/// defaulting to `ignore` for anything not listed.
pub struct FakePolicyEngine {
    decisions: Mutex<BTreeMap<String, PolicyDecision>>,
    evaluations: Mutex<usize>,
}

impl FakePolicyEngine {
    pub fn new() -> Self {
        Self {
            decisions: Mutex::new(BTreeMap::new()),
            evaluations: Mutex::new(0),
        }
    }

    pub fn set_decision(&self, resource_id: impl Into<String>, decision: PolicyDecision) {
        self.decisions.lock().insert(resource_id.into(), decision);
    }

    pub fn evaluation_count(&self) -> usize {
        *self.evaluations.lock()
    }
}

impl Default for FakePolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyEngine for FakePolicyEngine {
    async fn evaluate(&self, _ctx: &CycleContext, input: &PolicyInput) -> Result<PolicyDecision, PolicyError> {
        *self.evaluations.lock() += 1;
        Ok(self
            .decisions
            .lock()
            .get(input.resource.id.as_str())
            .cloned()
            .unwrap_or_else(|| PolicyDecision::ignore("no policy matched")))
    }

    fn load_policy(&self, _name: &str, _source: &str) -> Result<(), PolicyError> {
        Ok(())
    }
}
