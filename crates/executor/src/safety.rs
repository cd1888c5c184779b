// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composable pre-execution checks. Checks never short-circuit each
//! other — every check runs, for observability — and the executor only
//! blocks on a `critical`-severity failure.

use recon_core::{Action, Decision, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone)]
pub struct SafetyCheck {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub passed: bool,
    pub message: Option<String>,
}

impl SafetyCheck {
    fn pass(name: &'static str, description: &'static str, severity: Severity) -> Self {
        Self {
            name,
            description,
            severity,
            passed: true,
            message: None,
        }
    }

    fn fail(
        name: &'static str,
        description: &'static str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name,
            description,
            severity,
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// A single check is a pure function of the decision and the resource's
/// current observed state (`None` if never observed / already gone).
pub trait Check: Send + Sync {
    fn run(&self, decision: &Decision, current: Option<&Resource>) -> SafetyCheck;
}

/// Runs every registered check and reports whether any critical check
/// failed, without stopping at the first failure.
pub struct SafetyChecker {
    checks: Vec<Box<dyn Check>>,
}

impl Default for SafetyChecker {
    fn default() -> Self {
        Self::standard()
    }
}

impl SafetyChecker {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// The five required standard checks, in the order named.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(BlessedResourceCheck),
            Box::new(ResourceExistenceCheck),
            Box::new(DestructiveActionCheck),
            Box::new(ResourceOwnershipCheck),
            Box::new(ProviderLimitsCheck),
        ])
    }

    pub fn run_all(&self, decision: &Decision, current: Option<&Resource>) -> Vec<SafetyCheck> {
        self.checks.iter().map(|c| c.run(decision, current)).collect()
    }

    /// Whether the executor must block this decision: any check failed
    /// at critical severity.
    pub fn blocks(checks: &[SafetyCheck]) -> bool {
        checks.iter().any(|c| !c.passed && c.severity == Severity::Critical)
    }
}

pub struct BlessedResourceCheck;

impl Check for BlessedResourceCheck {
    fn run(&self, decision: &Decision, _current: Option<&Resource>) -> SafetyCheck {
        let name = "blessed_resource_check";
        let description = "refuses destructive actions against blessed resources";
        if decision.is_blessed && decision.action.is_destructive() {
            return SafetyCheck::fail(
                name,
                description,
                Severity::Critical,
                "resource is blessed; destructive action refused",
            );
        }
        SafetyCheck::pass(name, description, Severity::Critical)
    }
}

pub struct ResourceExistenceCheck;

impl Check for ResourceExistenceCheck {
    fn run(&self, decision: &Decision, current: Option<&Resource>) -> SafetyCheck {
        let name = "resource_existence_check";
        let description = "destructive actions require the resource to exist; create requires it not to";
        let severity = Severity::Error;
        match decision.action {
            Action::Create => {
                if current.is_some() {
                    return SafetyCheck::fail(name, description, severity, "resource already exists");
                }
            }
            Action::Delete | Action::Terminate | Action::Update | Action::Tag => {
                if current.is_none() {
                    return SafetyCheck::fail(name, description, severity, "resource does not exist");
                }
            }
            Action::Notify | Action::Noop => {}
        }
        SafetyCheck::pass(name, description, severity)
    }
}

pub struct DestructiveActionCheck;

impl Check for DestructiveActionCheck {
    fn run(&self, decision: &Decision, current: Option<&Resource>) -> SafetyCheck {
        let name = "destructive_action_check";
        let description = "destructive actions require a reason; important resources raise severity";
        if !decision.action.is_destructive() {
            return SafetyCheck::pass(name, description, Severity::Error);
        }

        let important = current.map(Resource::is_important).unwrap_or(false);
        let severity = if important { Severity::Critical } else { Severity::Error };

        if decision.reason.trim().is_empty() {
            return SafetyCheck::fail(name, description, severity, "missing reason for destructive action");
        }
        SafetyCheck::pass(name, description, severity)
    }
}

pub struct ResourceOwnershipCheck;

impl Check for ResourceOwnershipCheck {
    fn run(&self, decision: &Decision, current: Option<&Resource>) -> SafetyCheck {
        let name = "resource_ownership_check";
        let description = "non-create, non-delete actions require a managed resource";
        let severity = Severity::Error;

        let exempt = matches!(
            decision.action,
            Action::Create | Action::Delete | Action::Terminate | Action::Notify | Action::Noop
        );
        if exempt {
            return SafetyCheck::pass(name, description, severity);
        }

        let managed = current.map(Resource::is_managed).unwrap_or(false);
        if !managed {
            return SafetyCheck::fail(name, description, severity, "resource is not managed");
        }
        SafetyCheck::pass(name, description, severity)
    }
}

pub struct ProviderLimitsCheck;

impl Check for ProviderLimitsCheck {
    fn run(&self, _decision: &Decision, _current: Option<&Resource>) -> SafetyCheck {
        SafetyCheck::pass(
            "provider_limits_check",
            "placeholder for provider quota/rate-limit checks",
            Severity::Warning,
        )
    }
}

#[cfg(test)]
#[path = "safety_tests.rs"]
mod tests;
