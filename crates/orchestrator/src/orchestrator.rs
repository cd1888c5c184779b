// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::traits::{CycleContext, PolicyEngine, Scanner};
use chrono::Utc;
use parking_lot::Mutex;
use recon_core::{
    Action, ChangeEvent, Decision, DecisionId, IdGen, Metrics, NoopMetrics, UuidIdGen, WalEntryType,
};
use recon_executor::{Executor, ExecutionStatus, ExecutorOptions};
use recon_store::ObservationStore;
use recon_wal::{Wal, WalError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

/// Per-cycle counters, mirroring the contract's `CycleResult`. A cycle is
/// `success` as long as the scan itself returned a resource list; policy
/// and enforcement failures are collected in `errors` but never flip it.
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub resources_scanned: usize,
    pub policies_evaluated: usize,
    pub enforcement_actions: usize,
    pub errors: Vec<String>,
    pub duration: Duration,
    pub success: bool,
}

impl CycleResult {
    fn scan_failed(error: String, duration: Duration) -> Self {
        Self {
            resources_scanned: 0,
            policies_evaluated: 0,
            enforcement_actions: 0,
            errors: vec![error],
            duration,
            success: false,
        }
    }
}

fn parse_action(action: &str) -> Option<Action> {
    match action {
        "create" => Some(Action::Create),
        "update" => Some(Action::Update),
        "delete" => Some(Action::Delete),
        "terminate" => Some(Action::Terminate),
        "tag" => Some(Action::Tag),
        "notify" => Some(Action::Notify),
        "noop" => Some(Action::Noop),
        _ => None,
    }
}

/// Drives one reconciliation cycle end to end: scan, record observations,
/// evaluate policy per resource, hand non-ignore decisions to the
/// executor. Holds its collaborators behind `Arc`/trait objects so a
/// production wiring (real cloud scanner, real policy runtime) and a test
/// wiring (in-memory fakes) share the same driver.
pub struct Orchestrator<G: IdGen = UuidIdGen> {
    scanner: Arc<dyn Scanner>,
    policy_engine: Arc<dyn PolicyEngine>,
    store: Arc<ObservationStore>,
    executor: Arc<Executor>,
    wal: Arc<Mutex<Wal>>,
    id_gen: G,
    default_options: ExecutorOptions,
    metrics: Arc<dyn Metrics>,
}

impl<G: IdGen> Orchestrator<G> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scanner: Arc<dyn Scanner>,
        policy_engine: Arc<dyn PolicyEngine>,
        store: Arc<ObservationStore>,
        executor: Arc<Executor>,
        wal: Arc<Mutex<Wal>>,
        id_gen: G,
        default_options: ExecutorOptions,
    ) -> Self {
        Self {
            scanner,
            policy_engine,
            store,
            executor,
            wal,
            id_gen,
            default_options,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replace the metrics sink. Defaults to [`NoopMetrics`].
    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    fn append_wal(&self, entry_type: WalEntryType, resource_id: Option<String>, payload: serde_json::Value) -> Result<u64, WalError> {
        let mut wal = self.wal.lock();
        let seq = wal.append(entry_type, resource_id, payload)?;
        wal.flush()?;
        Ok(seq)
    }

    /// Like [`Self::append_wal`], but only fsyncs once the WAL's own
    /// group-commit policy says it's due. Used for the bulk per-resource
    /// `Observed` entries a scan produces, where fsyncing on every single
    /// entry would defeat group commit; callers using this must flush
    /// explicitly once the batch is done.
    fn append_wal_buffered(
        &self,
        entry_type: WalEntryType,
        resource_id: Option<String>,
        payload: serde_json::Value,
    ) -> Result<u64, WalError> {
        let mut wal = self.wal.lock();
        let seq = wal.append(entry_type, resource_id, payload)?;
        if wal.needs_flush() {
            wal.flush()?;
        }
        Ok(seq)
    }

    fn flush_wal(&self) -> Result<(), WalError> {
        self.wal.lock().flush()
    }

    /// Runs exactly one scan/evaluate/enforce pass and returns its counters.
    pub async fn run_cycle_once(&self, cancellation: CancellationToken) -> CycleResult {
        let started = Instant::now();
        let scan_started_at = Utc::now();
        let ctx = CycleContext::new(cancellation);

        let scanned = match self.scanner.scan(&ctx).await {
            Ok(resources) => resources,
            Err(e) => {
                self.metrics.inc_counter("scan_errors", &[]);
                return CycleResult::scan_failed(e.to_string(), started.elapsed());
            }
        };
        let resources_scanned = scanned.len();

        for resource in &scanned {
            let payload = serde_json::to_value(resource).unwrap_or_default();
            if let Err(e) =
                self.append_wal_buffered(WalEntryType::Observed, Some(resource.id.as_str().to_string()), payload)
            {
                warn!(error = %e, resource_id = %resource.id, "failed to append observed WAL entry");
            }
        }

        let (_, change_events) = self.store.record_observation_batch(scanned.clone());
        for change in &change_events {
            let kind_label = format!("{:?}", change.kind).to_lowercase();
            self.metrics.inc_counter("resources_changed", &[("kind", &kind_label)]);
        }
        let changes: BTreeMap<String, ChangeEvent> = change_events
            .into_iter()
            .map(|change| (change.resource_id.as_str().to_string(), change))
            .collect();

        let mut policies_evaluated = 0usize;
        let mut enforcement_actions = 0usize;
        let mut errors = Vec::new();

        // Anything last seen before this cycle's scan started, and not
        // refreshed by it, dropped out of band (not through a decision this
        // tool executed) and is gone. The store only tracks observations;
        // the sweep itself is the orchestrator's job.
        for stale in self.store.list_stale_since(scan_started_at) {
            let identity = stale.identity();
            match self.store.record_disappearance(&identity, Utc::now()) {
                Ok(_) => {
                    self.metrics.inc_counter("resources_changed", &[("kind", "disappeared")]);
                    let payload = serde_json::json!({"disappeared": true});
                    if let Err(e) = self.append_wal_buffered(
                        WalEntryType::Observed,
                        Some(stale.id.as_str().to_string()),
                        payload,
                    ) {
                        warn!(error = %e, resource_id = %stale.id, "failed to append disappearance WAL entry");
                    }
                }
                Err(e) => {
                    errors.push(format!("failed to record disappearance for {}: {e}", stale.id));
                }
            }
        }

        if let Err(e) = self.flush_wal() {
            warn!(error = %e, "failed to flush observed/disappearance WAL entries before policy evaluation");
        }

        for resource in &scanned {
            if ctx.cancellation.is_cancelled() {
                errors.push("cycle cancelled before all resources were evaluated".to_string());
                break;
            }

            let change = changes.get(resource.id.as_str()).cloned();
            let input = self.policy_engine.build_policy_input(resource, change);
            policies_evaluated += 1;

            let decision = match self.policy_engine.evaluate(&ctx, &input).await {
                Ok(decision) => decision,
                Err(e) => {
                    errors.push(format!("policy evaluation failed for {}: {e}", resource.id));
                    continue;
                }
            };

            if decision.is_ignore() {
                continue;
            }

            let Some(action) = parse_action(&decision.action) else {
                errors.push(format!("unknown policy action {:?} for {}", decision.action, resource.id));
                continue;
            };

            let decided_payload = serde_json::json!({
                "action": decision.action,
                "reason": decision.reason,
                "confidence": decision.confidence,
                "risk": decision.risk,
            });
            if let Err(e) = self.append_wal(WalEntryType::Decided, Some(resource.id.as_str().to_string()), decided_payload) {
                warn!(error = %e, resource_id = %resource.id, "failed to append decided WAL entry");
            }

            let is_blessed = resource
                .tags
                .get(recon_core::tag_keys::BLESSED)
                .map(|v| v == "true")
                .unwrap_or(false);

            let built = Decision::new(
                DecisionId::new(self.id_gen.next()),
                action,
                resource.provider.clone(),
                resource.id.clone(),
                resource.resource_type.clone(),
                decision.reason.clone(),
                is_blessed,
                Utc::now(),
            );

            let built = match built {
                Ok(decision) => decision,
                Err(e) => {
                    errors.push(format!("invalid decision for {}: {e}", resource.id));
                    continue;
                }
            };

            let result = self.executor.execute_one(&built, &self.default_options).await;
            enforcement_actions += 1;
            if result.status == ExecutionStatus::Failed {
                errors.push(
                    result
                        .message
                        .unwrap_or_else(|| format!("enforcement failed for {}", resource.id)),
                );
            }
        }

        if !errors.is_empty() {
            self.metrics.inc_counter("cycle_errors", &[]);
        }
        let duration = started.elapsed();
        self.metrics.observe_duration("scan_duration", duration, &[]);

        CycleResult {
            resources_scanned,
            policies_evaluated,
            enforcement_actions,
            errors,
            duration,
            success: true,
        }
    }

    /// Runs cycles on a fixed interval until `cancellation` fires.
    pub async fn run_periodic(self: Arc<Self>, interval: Duration, cancellation: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = self
                        .run_cycle_once(cancellation.clone())
                        .instrument(info_span!("reconcile_cycle"))
                        .await;
                    info!(
                        resources_scanned = result.resources_scanned,
                        policies_evaluated = result.policies_evaluated,
                        enforcement_actions = result.enforcement_actions,
                        success = result.success,
                        elapsed_ms = result.duration.as_millis() as u64,
                        "reconciliation cycle finished"
                    );
                    if !result.errors.is_empty() {
                        warn!(errors = ?result.errors, "cycle completed with errors");
                    }
                }
                _ = cancellation.cancelled() => {
                    info!("orchestrator loop cancelled");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
