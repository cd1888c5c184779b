// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;

fn sample_decision() -> Decision {
    Decision {
        id: "d-1".into(),
        action: recon_core::Action::Delete,
        provider: "aws".to_string(),
        resource_id: "i-1".into(),
        resource_type: "ec2".to_string(),
        reason: "cleanup".to_string(),
        is_blessed: false,
        created_at: Utc::now(),
    }
}

fn request(decision: &Decision) -> ConfirmationRequest<'_> {
    ConfirmationRequest {
        decision,
        message: "confirm?".to_string(),
        severity: Severity::High,
        default_no: true,
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn responses_are_consumed_in_order_then_default_to_approve() {
    let confirmer = FakeConfirmer::new(vec![false, true]);
    let decision = sample_decision();

    let first = confirmer.request_confirmation(request(&decision)).await;
    assert!(!first.approved);

    let second = confirmer.request_confirmation(request(&decision)).await;
    assert!(second.approved);

    let third = confirmer.request_confirmation(request(&decision)).await;
    assert!(third.approved);
    assert_eq!(confirmer.call_count(), 3);
}

#[tokio::test]
async fn always_approve_never_declines() {
    let confirmer = FakeConfirmer::always_approve();
    let decision = sample_decision();
    let response = confirmer.request_confirmation(request(&decision)).await;
    assert!(response.approved);
}
