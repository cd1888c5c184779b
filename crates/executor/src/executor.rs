// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-decision state machine: validate, resolve provider, run safety
//! checks, gate on destructive/blessed/confirmation, dispatch, and record.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use recon_core::{
    Action, Clock, Decision, DecisionValidationError, ErrorKind, Metrics, NoopMetrics, Resource,
    SystemClock, WalEntryType,
};
use recon_providers::{Provider, ProviderError, ProviderMap, ProviderMapError, ResourceSpec};
use recon_store::ObservationStore;
use recon_wal::{Wal, WalError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::confirmer::{ConfirmationRequest, Confirmer, Severity as ConfirmSeverity};
use crate::result::{
    DecisionResult, DryRunClass, DryRunEntry, DryRunResult, ExecutionResult, ExecutionStatus,
};
use crate::rollback::RollbackManager;
use crate::safety::{SafetyCheck, SafetyChecker, Severity};
use crate::ExecutorOptions;

/// Concrete error taxonomy for a single decision's execution, mapping onto
/// the abstract kinds in [`recon_core::ErrorKind`].
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("decision failed validation: {0}")]
    Validation(#[from] DecisionValidationError),
    #[error("no provider registered: {0}")]
    UnknownProvider(#[from] ProviderMapError),
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("WAL append failed: {0}")]
    Wal(#[from] WalError),
    #[error("confirmation required but no confirmer configured")]
    ConfirmationUnavailable,
    #[error("blessed resource refused destructive action at dispatch time")]
    BlessedRefused,
    #[error("decision timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

impl ExecuteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecuteError::Validation(_) => ErrorKind::Validation,
            ExecuteError::UnknownProvider(_) => ErrorKind::Validation,
            ExecuteError::Provider(_) => ErrorKind::ProviderError,
            ExecuteError::Wal(_) => ErrorKind::DurabilityError,
            ExecuteError::ConfirmationUnavailable => ErrorKind::ConfirmationUnavailable,
            ExecuteError::BlessedRefused => ErrorKind::BlessedProtected,
            ExecuteError::TimedOut(_) => ErrorKind::CancelledOrTimedOut,
        }
    }
}

enum DecisionOutcome {
    Success {
        resource: Option<Resource>,
        original_state: Option<Resource>,
        safety_checks: Vec<SafetyCheck>,
    },
    Skipped {
        reason: String,
        safety_checks: Vec<SafetyCheck>,
    },
    Failed {
        error: ExecuteError,
        safety_checks: Vec<SafetyCheck>,
    },
}

fn validate(decision: &Decision) -> Result<(), DecisionValidationError> {
    if decision.action.is_destructive() && decision.reason.trim().is_empty() {
        return Err(DecisionValidationError::MissingReason {
            action: decision.action,
        });
    }
    if !matches!(decision.action, Action::Create) && decision.resource_id.as_str().trim().is_empty() {
        return Err(DecisionValidationError::MissingResourceId {
            action: decision.action,
        });
    }
    Ok(())
}

fn confirmation_severity(decision: &Decision) -> ConfirmSeverity {
    if decision.action.is_destructive() {
        ConfirmSeverity::High
    } else if decision.is_blessed {
        ConfirmSeverity::Medium
    } else {
        ConfirmSeverity::Low
    }
}

fn safety_block_reason(checks: &[SafetyCheck]) -> String {
    let blocking: Vec<&str> = checks
        .iter()
        .filter(|c| !c.passed && c.severity == Severity::Critical)
        .map(|c| c.name)
        .collect();
    format!("blocked by safety check(s): {}", blocking.join(", "))
}

/// Runs decisions against providers, gated by safety checks, confirmation,
/// and the destructive/blessed guards in [`ExecutorOptions`].
///
/// Decisions within a batch are processed strictly sequentially;
/// `max_concurrency` is accepted for forward compatibility but unused.
pub struct Executor<C: Clock = SystemClock> {
    providers: Arc<ProviderMap>,
    store: Arc<ObservationStore>,
    wal: Arc<Mutex<Wal>>,
    safety: Arc<SafetyChecker>,
    rollback: Arc<RollbackManager>,
    confirmer: Option<Arc<dyn Confirmer>>,
    clock: C,
    metrics: Arc<dyn Metrics>,
}

impl<C: Clock> Executor<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        providers: Arc<ProviderMap>,
        store: Arc<ObservationStore>,
        wal: Arc<Mutex<Wal>>,
        safety: Arc<SafetyChecker>,
        rollback: Arc<RollbackManager>,
        confirmer: Option<Arc<dyn Confirmer>>,
        clock: C,
    ) -> Self {
        Self {
            providers,
            store,
            wal,
            safety,
            rollback,
            confirmer,
            clock,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replace the metrics sink. Defaults to [`NoopMetrics`].
    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn rollback_manager(&self) -> &RollbackManager {
        &self.rollback
    }

    fn append_wal(
        &self,
        entry_type: WalEntryType,
        resource_id: Option<String>,
        payload: serde_json::Value,
    ) -> Result<u64, ExecuteError> {
        let mut wal = self.wal.lock();
        let seq = wal.append(entry_type, resource_id, payload)?;
        wal.flush()?;
        Ok(seq)
    }

    fn append_wal_error(
        &self,
        entry_type: WalEntryType,
        resource_id: Option<String>,
        payload: serde_json::Value,
        error: String,
    ) -> Result<u64, ExecuteError> {
        let mut wal = self.wal.lock();
        let seq = wal.append_error(entry_type, resource_id, payload, error)?;
        wal.flush()?;
        Ok(seq)
    }

    /// Dispatch the decision's action to its provider. Assumes gating
    /// (safety, destructive/blessed allowances, confirmation) already
    /// passed. Returns the newly created resource for `create`, `None`
    /// otherwise.
    async fn dispatch(
        &self,
        provider: &dyn Provider,
        decision: &Decision,
        current: Option<&Resource>,
    ) -> Result<Option<Resource>, ExecuteError> {
        self.append_wal(
            WalEntryType::Executing,
            Some(decision.resource_id.as_str().to_string()),
            serde_json::to_value(decision).unwrap_or_default(),
        )?;

        let outcome: Result<Option<Resource>, ProviderError> = match decision.action {
            Action::Create => {
                let spec = ResourceSpec {
                    resource_type: decision.resource_type.clone(),
                    name: decision.resource_id.as_str().to_string(),
                    tags: BTreeMap::new(),
                    attrs: BTreeMap::new(),
                };
                provider.create_resource(&spec).await.map(Some)
            }
            Action::Update | Action::Tag => provider
                .tag_resource(&decision.resource_id, &BTreeMap::new())
                .await
                .map(|()| None),
            Action::Delete | Action::Terminate => {
                if decision.is_blessed {
                    let err = ExecuteError::BlessedRefused;
                    self.append_wal_error(
                        WalEntryType::Failed,
                        Some(decision.resource_id.as_str().to_string()),
                        serde_json::Value::Null,
                        err.to_string(),
                    )?;
                    return Err(err);
                }
                provider.delete_resource(&decision.resource_id).await.map(|()| None)
            }
            Action::Notify => {
                tracing::info!(
                    resource_id = %decision.resource_id,
                    reason = %decision.reason,
                    "notification (default sink: log)"
                );
                Ok(None)
            }
            Action::Noop => Ok(None),
        };

        match outcome {
            Ok(resource) => {
                match decision.action {
                    Action::Create => {
                        if let Some(r) = &resource {
                            self.store.record_observation(r.clone());
                        }
                    }
                    Action::Delete | Action::Terminate => {
                        if let Some(c) = current {
                            if let Err(e) = self.store.record_disappearance(&c.identity(), self.clock.now()) {
                                tracing::warn!(error = %e, "failed to record disappearance after successful delete");
                            }
                        }
                    }
                    _ => {}
                }
                self.append_wal(
                    WalEntryType::Executed,
                    Some(decision.resource_id.as_str().to_string()),
                    serde_json::to_value(&resource).unwrap_or_default(),
                )?;
                Ok(resource)
            }
            Err(provider_err) => {
                self.append_wal_error(
                    WalEntryType::Failed,
                    Some(decision.resource_id.as_str().to_string()),
                    serde_json::Value::Null,
                    provider_err.to_string(),
                )?;
                Err(ExecuteError::Provider(provider_err))
            }
        }
    }

    async fn execute_checked(&self, decision: &Decision, options: &ExecutorOptions) -> DecisionOutcome {
        if let Err(e) = validate(decision) {
            return DecisionOutcome::Failed {
                error: ExecuteError::Validation(e),
                safety_checks: Vec::new(),
            };
        }

        let provider = match self.providers.get(&decision.provider) {
            Ok(p) => p,
            Err(e) => {
                return DecisionOutcome::Failed {
                    error: ExecuteError::UnknownProvider(e),
                    safety_checks: Vec::new(),
                }
            }
        };

        let current = self.store.find_current(&decision.provider, &decision.resource_id);
        let safety_checks = self.safety.run_all(decision, current.as_ref());
        if SafetyChecker::blocks(&safety_checks) {
            return DecisionOutcome::Skipped {
                reason: safety_block_reason(&safety_checks),
                safety_checks,
            };
        }

        if decision.action.is_destructive() && !options.allow_destructive {
            return DecisionOutcome::Skipped {
                reason: "destructive action not allowed by executor options".to_string(),
                safety_checks,
            };
        }
        if decision.is_blessed && !options.allow_blessed_changes {
            return DecisionOutcome::Skipped {
                reason: "blessed resource changes not allowed by executor options".to_string(),
                safety_checks,
            };
        }

        if decision.action.requires_confirmation(decision.is_blessed) && !options.skip_confirmation {
            match &self.confirmer {
                None => {
                    return DecisionOutcome::Failed {
                        error: ExecuteError::ConfirmationUnavailable,
                        safety_checks,
                    }
                }
                Some(confirmer) => {
                    let message = format!(
                        "{:?} {} ({})",
                        decision.action, decision.resource_id, decision.reason
                    );
                    let response = confirmer
                        .request_confirmation(ConfirmationRequest {
                            decision,
                            message,
                            severity: confirmation_severity(decision),
                            default_no: true,
                            timeout: options.timeout,
                        })
                        .await;
                    if !response.approved {
                        return DecisionOutcome::Skipped {
                            reason: "confirmation declined".to_string(),
                            safety_checks,
                        };
                    }
                }
            }
        }

        match self.dispatch(provider.as_ref(), decision, current.as_ref()).await {
            Ok(resource) => DecisionOutcome::Success {
                resource,
                original_state: current,
                safety_checks,
            },
            Err(error) => DecisionOutcome::Failed { error, safety_checks },
        }
    }

    async fn execute_timed(&self, decision: &Decision, options: &ExecutorOptions) -> DecisionOutcome {
        match tokio::time::timeout(options.timeout, self.execute_checked(decision, options)).await {
            Ok(outcome) => outcome,
            Err(_) => DecisionOutcome::Failed {
                error: ExecuteError::TimedOut(options.timeout),
                safety_checks: Vec::new(),
            },
        }
    }

    fn finalize(
        &self,
        decision: &Decision,
        outcome: DecisionOutcome,
        options: &ExecutorOptions,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> DecisionResult {
        match outcome {
            DecisionOutcome::Success {
                resource,
                original_state,
                safety_checks,
            } => {
                if options.enable_rollback {
                    self.rollback
                        .record_execution(decision.clone(), original_state, finished_at);
                }
                DecisionResult {
                    decision_id: decision.id.clone(),
                    status: ExecutionStatus::Success,
                    resource_id: resource.map(|r| r.id),
                    message: None,
                    safety_checks,
                    started_at,
                    finished_at,
                }
            }
            DecisionOutcome::Skipped { reason, safety_checks } => DecisionResult {
                decision_id: decision.id.clone(),
                status: ExecutionStatus::Skipped,
                resource_id: None,
                message: Some(reason),
                safety_checks,
                started_at,
                finished_at,
            },
            DecisionOutcome::Failed { error, safety_checks } => DecisionResult {
                decision_id: decision.id.clone(),
                status: ExecutionStatus::Failed,
                resource_id: None,
                message: Some(error.to_string()),
                safety_checks,
                started_at,
                finished_at,
            },
        }
    }

    /// Execute a single decision end to end, logging a span around it.
    pub async fn execute_one(&self, decision: &Decision, options: &ExecutorOptions) -> DecisionResult {
        let started_at = self.clock.now();
        let span = tracing::info_span!(
            "execute_decision",
            decision_id = %decision.id,
            action = ?decision.action,
            resource_id = %decision.resource_id,
        );
        let _guard = span.enter();

        let start = Instant::now();
        let outcome = self.execute_timed(decision, options).await;
        let elapsed = start.elapsed();

        let action_label = format!("{:?}", decision.action).to_lowercase();
        match &outcome {
            DecisionOutcome::Success { .. } => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "decision succeeded");
                self.metrics
                    .inc_counter("decisions_executed", &[("action", &action_label), ("status", "success")]);
            }
            DecisionOutcome::Skipped { reason, .. } => {
                tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, reason, "decision skipped");
                self.metrics
                    .inc_counter("decisions_executed", &[("action", &action_label), ("status", "skipped")]);
            }
            DecisionOutcome::Failed { error, .. } => {
                tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %error,
                    "decision failed"
                );
                self.metrics
                    .inc_counter("decisions_executed", &[("action", &action_label), ("status", "failed")]);
            }
        }
        self.metrics
            .observe_duration("decision_execution_duration", elapsed, &[("action", &action_label)]);

        let finished_at = self.clock.now();
        self.finalize(decision, outcome, options, started_at, finished_at)
    }

    /// Execute every decision in order. Stops early when a decision fails
    /// and `continue_on_failure` is false; per-decision failures never
    /// surface as a batch-level error.
    pub async fn execute_all(&self, decisions: &[Decision], options: &ExecutorOptions) -> ExecutionResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(decisions.len());
        let (mut successful, mut failed, mut skipped) = (0usize, 0usize, 0usize);
        let mut stopped_early = false;

        for decision in decisions {
            let result = self.execute_one(decision, options).await;
            let is_failure = result.status == ExecutionStatus::Failed;
            match result.status {
                ExecutionStatus::Success => successful += 1,
                ExecutionStatus::Failed => failed += 1,
                ExecutionStatus::Skipped => skipped += 1,
                _ => {}
            }
            let stop_here = is_failure && !options.continue_on_failure;
            results.push(result);
            if stop_here {
                stopped_early = true;
                break;
            }
        }

        let partial_failure = failed > 0 || stopped_early;
        let rollback_required = partial_failure && options.rollback_on_partial_fail;

        ExecutionResult {
            results,
            successful,
            failed,
            skipped,
            partial_failure,
            rollback_required,
            duration: start.elapsed(),
        }
    }

    /// Classify each decision without invoking a provider or writing to
    /// the WAL.
    pub fn dry_run(&self, decisions: &[Decision]) -> DryRunResult {
        let mut entries = Vec::with_capacity(decisions.len());
        let (mut safe, mut blocked, mut destructive, mut blessed) = (0usize, 0usize, 0usize, 0usize);

        for decision in decisions {
            let current = self.store.find_current(&decision.provider, &decision.resource_id);
            let safety_checks = self.safety.run_all(decision, current.as_ref());

            let class = if SafetyChecker::blocks(&safety_checks) {
                blocked += 1;
                DryRunClass::Blocked
            } else if decision.is_blessed {
                blessed += 1;
                DryRunClass::Blessed
            } else if decision.action.is_destructive() {
                destructive += 1;
                DryRunClass::Destructive
            } else {
                safe += 1;
                DryRunClass::Safe
            };

            entries.push(DryRunEntry {
                decision_id: decision.id.clone(),
                class,
                safety_checks,
            });
        }

        let estimated_duration = std::time::Duration::from_millis(50) * entries.len() as u32;

        DryRunResult {
            entries,
            safe,
            blocked,
            destructive,
            blessed,
            estimated_duration,
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
