// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use recon_core::{ChangeEvent, Resource};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Carries the cancellation token and timing context threaded through one
/// `run_cycle` call. Every suspension point (`Scanner`, `PolicyEngine`,
/// `Confirmer`, provider calls) receives a clone and must honor it promptly.
#[derive(Clone)]
pub struct CycleContext {
    pub cancellation: CancellationToken,
}

impl CycleContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan failed: {0}")]
    Failed(String),
    #[error("scan cancelled")]
    Cancelled,
}

/// Enumerates the resources a cloud account currently holds. The
/// orchestrator treats the returned list as an authoritative snapshot at
/// the moment `scan` returns.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, ctx: &CycleContext) -> Result<Vec<Resource>, ScanError>;
}

/// The resource (plus any change derived against its prior observation)
/// handed to a `PolicyEngine` for one evaluation.
#[derive(Debug, Clone)]
pub struct PolicyInput {
    pub resource: Resource,
    pub change: Option<ChangeEvent>,
}

/// A policy's verdict for one resource. `action == "ignore"` means the
/// orchestrator skips enforcement entirely; anything else is handed to the
/// executor.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: String,
    pub reason: String,
    pub confidence: f64,
    pub risk: String,
}

impl PolicyDecision {
    pub fn ignore(reason: impl Into<String>) -> Self {
        Self {
            action: "ignore".to_string(),
            reason: reason.into(),
            confidence: 1.0,
            risk: "none".to_string(),
        }
    }

    pub fn is_ignore(&self) -> bool {
        self.action == "ignore"
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy evaluation failed: {0}")]
    EvaluationFailed(String),
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),
    #[error("failed to load policy {name}: {source}")]
    LoadFailed { name: String, source: String },
}

/// The seam between observed resources and the decisions the executor
/// carries out. Implementations may be backed by a rules engine, a
/// scripting runtime, or (in tests) a fixed table.
#[async_trait]
pub trait PolicyEngine: Send + Sync {
    fn build_policy_input(&self, resource: &Resource, change: Option<ChangeEvent>) -> PolicyInput {
        PolicyInput { resource: resource.clone(), change }
    }

    async fn evaluate(&self, ctx: &CycleContext, input: &PolicyInput) -> Result<PolicyDecision, PolicyError>;

    /// Loads or replaces a named policy definition from source. Engines
    /// that only support a fixed built-in table may reject every name.
    fn load_policy(&self, name: &str, source: &str) -> Result<(), PolicyError>;
}

#[cfg(test)]
#[path = "traits_tests.rs"]
mod tests;
