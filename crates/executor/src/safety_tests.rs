// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use recon_core::tag_keys;
use std::collections::BTreeMap;

fn decision(action: Action, is_blessed: bool, reason: &str) -> Decision {
    Decision {
        id: "d-1".into(),
        action,
        provider: "aws".to_string(),
        resource_id: "i-1".into(),
        resource_type: "ec2".to_string(),
        reason: reason.to_string(),
        is_blessed,
        created_at: Utc::now(),
    }
}

fn managed_resource() -> Resource {
    let mut tags = BTreeMap::new();
    tags.insert(tag_keys::MANAGED.to_string(), "true".to_string());
    Resource {
        id: "i-1".into(),
        provider: "aws".to_string(),
        region: "us-east-1".to_string(),
        account: "111111111111".to_string(),
        resource_type: "ec2".to_string(),
        name: "web".to_string(),
        status: "running".to_string(),
        tags,
        attrs: BTreeMap::new(),
        observed_at: Utc::now(),
    }
}

#[test]
fn blessed_resource_check_blocks_destructive_blessed_actions() {
    let check = BlessedResourceCheck;
    let d = decision(Action::Delete, true, "cleanup");
    let result = check.run(&d, Some(&managed_resource()));
    assert!(!result.passed);
    assert_eq!(result.severity, Severity::Critical);
}

#[test]
fn blessed_resource_check_allows_non_destructive_blessed_actions() {
    let check = BlessedResourceCheck;
    let d = decision(Action::Tag, true, "");
    let result = check.run(&d, Some(&managed_resource()));
    assert!(result.passed);
}

#[test]
fn resource_existence_check_fails_create_on_existing_resource() {
    let check = ResourceExistenceCheck;
    let d = decision(Action::Create, false, "scale up");
    let result = check.run(&d, Some(&managed_resource()));
    assert!(!result.passed);
}

#[test]
fn resource_existence_check_fails_delete_on_missing_resource() {
    let check = ResourceExistenceCheck;
    let d = decision(Action::Delete, false, "cleanup");
    let result = check.run(&d, None);
    assert!(!result.passed);
}

#[test]
fn destructive_action_check_fails_on_empty_reason() {
    let check = DestructiveActionCheck;
    let d = decision(Action::Delete, false, "");
    let result = check.run(&d, Some(&managed_resource()));
    assert!(!result.passed);
    assert_eq!(result.severity, Severity::Error);
}

#[test]
fn destructive_action_check_escalates_to_critical_for_important_resources() {
    let check = DestructiveActionCheck;
    let mut resource = managed_resource();
    resource
        .tags
        .insert(tag_keys::ENVIRONMENT.to_string(), "production".to_string());
    let d = decision(Action::Delete, false, "");
    let result = check.run(&d, Some(&resource));
    assert!(!result.passed);
    assert_eq!(result.severity, Severity::Critical);
}

#[test]
fn resource_ownership_check_fails_unmanaged_tag_action() {
    let check = ResourceOwnershipCheck;
    let mut resource = managed_resource();
    resource.tags.remove(tag_keys::MANAGED);
    let d = decision(Action::Tag, false, "");
    let result = check.run(&d, Some(&resource));
    assert!(!result.passed);
}

#[test]
fn resource_ownership_check_exempts_create_and_delete() {
    let check = ResourceOwnershipCheck;
    let create = decision(Action::Create, false, "scale up");
    assert!(check.run(&create, None).passed);
    let delete = decision(Action::Delete, false, "cleanup");
    assert!(check.run(&delete, Some(&managed_resource())).passed);
}

#[test]
fn provider_limits_check_always_passes() {
    let check = ProviderLimitsCheck;
    let d = decision(Action::Noop, false, "");
    assert!(check.run(&d, None).passed);
}

#[test]
fn standard_checker_blocks_on_any_critical_failure() {
    let checker = SafetyChecker::standard();
    let d = decision(Action::Delete, true, "cleanup");
    let checks = checker.run_all(&d, Some(&managed_resource()));
    assert!(SafetyChecker::blocks(&checks));
}

#[test]
fn standard_checker_does_not_block_on_error_only_failures() {
    let checker = SafetyChecker::standard();
    let d = decision(Action::Tag, false, "");
    let mut resource = managed_resource();
    resource.tags.remove(tag_keys::MANAGED);
    let checks = checker.run_all(&d, Some(&resource));
    assert!(checks.iter().any(|c| !c.passed));
    assert!(!SafetyChecker::blocks(&checks));
}
