// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the collaborator graph (`ProviderMap`, `ObservationStore`,
//! `Executor`, `Orchestrator`) from a loaded [`Config`], the way the
//! process wiring is assembled once at startup and then handed to the
//! main loop.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use recon_core::{Resource, SystemClock, TracingMetrics, UuidIdGen};
use recon_executor::{Executor, ExecutorOptions, RollbackManager, SafetyChecker};
use recon_orchestrator::{CycleContext, Orchestrator, PolicyDecision, PolicyEngine, PolicyError, PolicyInput};
use recon_providers::{NoopProvider, ProviderMap};
use recon_store::ObservationStore;
use recon_wal::{Wal, WalConfig};

use crate::config::Config;
use crate::error::DaemonError;

/// The policy engine used when no real policy runtime is configured: every
/// resource is ignored. A real policy language evaluator is out of scope
/// here; it plugs in behind the same [`PolicyEngine`] trait.
pub struct NoopPolicyEngine;

#[async_trait]
impl PolicyEngine for NoopPolicyEngine {
    async fn evaluate(&self, _ctx: &CycleContext, _input: &PolicyInput) -> Result<PolicyDecision, PolicyError> {
        Ok(PolicyDecision::ignore("no policy engine configured"))
    }

    fn load_policy(&self, name: &str, _source: &str) -> Result<(), PolicyError> {
        Err(PolicyError::UnknownPolicy(name.to_string()))
    }
}

pub fn build_provider_map(config: &Config) -> Result<ProviderMap, DaemonError> {
    let mut builder = ProviderMap::builder();
    for provider in &config.providers {
        match provider.kind.as_str() {
            "noop" => {
                builder = builder.register(Arc::new(NoopProvider::new(provider.name.clone(), provider.region.clone())));
            }
            other => return Err(DaemonError::UnsupportedProviderKind(other.to_string())),
        }
    }
    Ok(builder.build())
}

/// Everything the main loop needs: the executor and orchestrator, plus the
/// shared handles (`store`, `wal`) it flushes and checkpoints on shutdown.
pub struct Wiring {
    pub store: Arc<ObservationStore>,
    pub wal: Arc<Mutex<Wal>>,
    pub orchestrator: Arc<Orchestrator<UuidIdGen>>,
}

pub fn build(config: &Config, initial_resources: Vec<Resource>) -> Result<Wiring, DaemonError> {
    std::fs::create_dir_all(&config.wal_dir)?;
    let wal = Wal::open(&config.wal_dir, WalConfig::default())?;
    let wal = Arc::new(Mutex::new(wal));

    let store = Arc::new(ObservationStore::new());
    if !initial_resources.is_empty() {
        store.record_observation_batch(initial_resources);
    }

    let providers = Arc::new(build_provider_map(config)?);

    let executor = Arc::new(
        Executor::new(
            providers.clone(),
            store.clone(),
            wal.clone(),
            Arc::new(SafetyChecker::standard()),
            Arc::new(RollbackManager::new()),
            None,
            SystemClock,
        )
        .with_metrics(Arc::new(TracingMetrics)),
    );

    let executor_options = ExecutorOptions {
        allow_destructive: config.allow_destructive,
        allow_blessed_changes: config.allow_blessed_changes,
        skip_confirmation: config.skip_confirmation,
        ..Default::default()
    };

    let scanner = Arc::new(ScannerOverProviders { providers });

    let orchestrator = Arc::new(
        Orchestrator::new(
            scanner,
            Arc::new(NoopPolicyEngine),
            store.clone(),
            executor,
            wal.clone(),
            UuidIdGen,
            executor_options,
        )
        .with_metrics(Arc::new(TracingMetrics)),
    );

    Ok(Wiring { store, wal, orchestrator })
}

/// Scans by listing every registered provider's resources and
/// concatenating the results, matching the contract's "authoritative
/// snapshot at the time of return".
struct ScannerOverProviders {
    providers: Arc<ProviderMap>,
}

#[async_trait]
impl recon_orchestrator::Scanner for ScannerOverProviders {
    async fn scan(&self, _ctx: &CycleContext) -> Result<Vec<Resource>, recon_orchestrator::ScanError> {
        let mut resources = Vec::new();
        for name in self.providers.names() {
            let provider = self
                .providers
                .get(name)
                .map_err(|e| recon_orchestrator::ScanError::Failed(e.to_string()))?;
            let found = provider
                .list_resources(&recon_providers::ResourceFilter::default())
                .await
                .map_err(|e| recon_orchestrator::ScanError::Failed(e.to_string()))?;
            resources.extend(found);
        }
        Ok(resources)
    }
}

#[cfg(test)]
#[path = "wiring_tests.rs"]
mod tests;
