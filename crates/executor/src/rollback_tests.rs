// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;

fn decision(action: Action, resource_id: &str) -> Decision {
    Decision {
        id: "d-1".into(),
        action,
        provider: "aws".to_string(),
        resource_id: resource_id.into(),
        resource_type: "ec2".to_string(),
        reason: "reason".to_string(),
        is_blessed: false,
        created_at: Utc::now(),
    }
}

#[test]
fn reversibility_matches_the_action_table() {
    assert_eq!(reversibility(Action::Create), Some(ReverseAction::Delete));
    assert_eq!(reversibility(Action::Tag), Some(ReverseAction::Untag));
    assert_eq!(reversibility(Action::Noop), Some(ReverseAction::Noop));
    assert_eq!(reversibility(Action::Update), None);
    assert_eq!(reversibility(Action::Delete), None);
    assert_eq!(reversibility(Action::Terminate), None);
    assert_eq!(reversibility(Action::Notify), None);
}

#[test]
fn record_execution_marks_can_rollback_from_reversibility() {
    let manager = RollbackManager::new();
    manager.record_execution(decision(Action::Create, "i-1"), None, Utc::now());
    manager.record_execution(decision(Action::Delete, "i-2"), None, Utc::now());

    let history = manager.history();
    assert!(history[0].can_rollback);
    assert!(!history[1].can_rollback);
}

#[test]
fn clear_history_empties_the_record() {
    let manager = RollbackManager::new();
    manager.record_execution(decision(Action::Tag, "i-1"), None, Utc::now());
    manager.clear_history();
    assert!(manager.history().is_empty());
}

#[test]
fn validate_rollback_sequence_warns_on_non_reversible_and_shared_resource() {
    let entries = vec![
        RollbackEntry {
            decision: decision(Action::Delete, "i-1"),
            original_state: None,
            reverse_action: None,
            executed_at: Utc::now(),
            can_rollback: false,
            rollback_reason: None,
        },
        RollbackEntry {
            decision: decision(Action::Tag, "i-1"),
            original_state: None,
            reverse_action: Some(ReverseAction::Untag),
            executed_at: Utc::now(),
            can_rollback: true,
            rollback_reason: None,
        },
    ];

    let warnings = RollbackManager::validate_rollback_sequence(&entries);
    assert!(warnings.iter().any(|w| w.message.contains("not reversible")));
    assert!(warnings.iter().any(|w| w.message.contains("share this resource_id")));
}

#[test]
fn rollback_of_noop_entries_always_succeeds() {
    let entries = vec![RollbackEntry {
        decision: decision(Action::Noop, "i-1"),
        original_state: None,
        reverse_action: Some(ReverseAction::Noop),
        executed_at: Utc::now(),
        can_rollback: true,
        rollback_reason: None,
    }];
    assert!(RollbackManager::rollback(&entries).is_ok());
}

#[test]
fn rollback_aggregates_non_reversible_entries_into_one_error() {
    let entries = vec![
        RollbackEntry {
            decision: decision(Action::Delete, "i-1"),
            original_state: None,
            reverse_action: None,
            executed_at: Utc::now(),
            can_rollback: false,
            rollback_reason: None,
        },
        RollbackEntry {
            decision: decision(Action::Update, "i-2"),
            original_state: None,
            reverse_action: None,
            executed_at: Utc::now(),
            can_rollback: false,
            rollback_reason: None,
        },
    ];
    let err = RollbackManager::rollback(&entries).unwrap_err();
    assert_eq!(err.0.len(), 2);
}

#[test]
fn rollback_processes_in_lifo_order() {
    // Only one of the two is reversible; verify both directions are
    // inspected regardless of order by asserting the failure set size.
    let entries = vec![
        RollbackEntry {
            decision: decision(Action::Create, "i-1"),
            original_state: None,
            reverse_action: Some(ReverseAction::Delete),
            executed_at: Utc::now(),
            can_rollback: true,
            rollback_reason: None,
        },
        RollbackEntry {
            decision: decision(Action::Delete, "i-2"),
            original_state: None,
            reverse_action: None,
            executed_at: Utc::now(),
            can_rollback: false,
            rollback_reason: None,
        },
    ];
    let err = RollbackManager::rollback(&entries).unwrap_err();
    assert_eq!(err.0.len(), 1);
    assert!(err.0[0].contains("i-2"));
}
