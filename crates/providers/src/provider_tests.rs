// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn retryable_error_reports_retryable() {
    let err = ProviderError::Retryable("throttled".into());
    assert!(err.is_retryable());
}

#[test]
fn non_retryable_errors_report_not_retryable() {
    assert!(!ProviderError::NotFound("i-1".into()).is_retryable());
    assert!(!ProviderError::Failed("boom".into()).is_retryable());
}

#[test]
fn empty_filter_has_no_constraints() {
    let filter = ResourceFilter::default();
    assert!(filter.resource_type.is_none());
    assert!(filter.tags.is_empty());
}
