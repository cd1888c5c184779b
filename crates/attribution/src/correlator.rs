// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{Timelike, Utc};
use recon_core::{ActivityEvent, ActorType, Attribution, AttributionMethod, ChangeKind, DriftEvent};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("invalid timezone name: {0}")]
    InvalidTimezone(String),
}

const TIME_WEIGHT: f64 = 0.4;
const IDENTITY_WEIGHT: f64 = 0.3;
const RELEVANCE_WEIGHT: f64 = 0.3;
const TIME_WINDOW_SECS: f64 = 300.0;
const ATTRIBUTION_THRESHOLD: f64 = 0.5;

/// Matches activity events to observed drift by time, identity, and API
/// relevance, falling back to a business-hours heuristic when nothing
/// scores highly enough.
pub struct AttributionCorrelator {
    business_hours_tz: chrono_tz::Tz,
}

impl Default for AttributionCorrelator {
    fn default() -> Self {
        Self::new(chrono_tz::UTC)
    }
}

impl AttributionCorrelator {
    pub fn new(business_hours_tz: chrono_tz::Tz) -> Self {
        Self { business_hours_tz }
    }

    pub fn with_timezone_str(tz: &str) -> Result<Self, AttributionError> {
        chrono_tz::Tz::from_str(tz)
            .map(Self::new)
            .map_err(|_| AttributionError::InvalidTimezone(tz.to_string()))
    }

    /// Scores every candidate event against the drift and returns the
    /// highest-scoring one as a `cloudtrail`-sourced attribution, or `None`
    /// if the best score doesn't clear the confidence threshold.
    pub fn correlate(&self, drift: &DriftEvent, events: &[ActivityEvent]) -> Option<Attribution> {
        let (score, event) = events
            .iter()
            .map(|event| (score_event(drift, event), event))
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))?;

        if score <= ATTRIBUTION_THRESHOLD {
            tracing::debug!(resource_id = %drift.resource_id, score, "no attribution cleared threshold");
            return None;
        }

        Some(Attribution {
            resource_id: drift.resource_id.clone(),
            actor: event.principal.clone(),
            actor_type: classify_actor_type(event),
            action: event.api_name.clone(),
            timestamp: event.timestamp,
            source_ip: event.source_ip.clone(),
            user_agent: event.user_agent.clone(),
            request_id: event.request_id.clone(),
            confidence: score,
            method: AttributionMethod::Cloudtrail,
        })
    }

    /// As `correlate`, but falls back to the business-hours heuristic
    /// instead of returning `None`.
    pub fn correlate_with_fallback(&self, drift: &DriftEvent, events: &[ActivityEvent]) -> Attribution {
        self.correlate(drift, events)
            .unwrap_or_else(|| self.heuristic_fallback(drift))
    }

    /// Guesses at an actor based only on the local clock: a drift observed
    /// during business hours is more likely human-driven, otherwise it's
    /// more likely an unattended automation run.
    pub fn heuristic_fallback(&self, drift: &DriftEvent) -> Attribution {
        let local_hour = drift.timestamp.with_timezone(&self.business_hours_tz).hour();
        let (actor_type, confidence) = if (9..17).contains(&local_hour) {
            (ActorType::Human, 0.4)
        } else {
            (ActorType::Automation, 0.35)
        };

        Attribution {
            resource_id: drift.resource_id.clone(),
            actor: "unknown".to_string(),
            actor_type,
            action: drift_action_label(drift.kind).to_string(),
            timestamp: drift.timestamp,
            source_ip: String::new(),
            user_agent: String::new(),
            request_id: String::new(),
            confidence,
            method: AttributionMethod::Heuristic,
        }
    }
}

fn score_event(drift: &DriftEvent, event: &ActivityEvent) -> f64 {
    let time = time_proximity_score(drift, event);
    let identity = if identity_matches(drift, event) { 1.0 } else { 0.0 };
    let relevance = if api_relevant(drift.kind, &event.api_name) { 1.0 } else { 0.0 };
    TIME_WEIGHT * time + IDENTITY_WEIGHT * identity + RELEVANCE_WEIGHT * relevance
}

fn time_proximity_score(drift: &DriftEvent, event: &ActivityEvent) -> f64 {
    let delta_secs = (drift.timestamp - event.timestamp).num_milliseconds().unsigned_abs() as f64 / 1000.0;
    (1.0 - delta_secs / TIME_WINDOW_SECS).max(0.0)
}

fn identity_matches(drift: &DriftEvent, event: &ActivityEvent) -> bool {
    let resource_id = drift.resource_id.as_str();
    if event.resource_id.as_deref() == Some(resource_id) {
        return true;
    }
    match &event.resource_name {
        Some(name) if !name.is_empty() => resource_id.contains(name.as_str()),
        _ => false,
    }
}

fn api_relevant(kind: ChangeKind, api_name: &str) -> bool {
    let name = api_name.to_ascii_lowercase();
    let keywords: &[&str] = match kind {
        ChangeKind::Created => &["create", "run", "launch", "provision"],
        ChangeKind::Modified | ChangeKind::TagsChanged => {
            &["update", "modify", "put", "tag", "attach", "detach", "set"]
        }
        ChangeKind::Disappeared => &["delete", "terminate", "remove", "destroy"],
    };
    keywords.iter().any(|keyword| name.contains(keyword))
}

fn classify_actor_type(event: &ActivityEvent) -> ActorType {
    let user_agent = event.user_agent.to_ascii_lowercase();
    if user_agent.contains("terraform") || user_agent.contains("cloudformation") {
        return ActorType::Automation;
    }
    match event.principal_type.as_str() {
        "AssumedRole" => ActorType::Service,
        "IAMUser" => ActorType::Human,
        _ => ActorType::Unknown,
    }
}

fn drift_action_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Created => "resource_created",
        ChangeKind::Modified => "resource_modified",
        ChangeKind::TagsChanged => "resource_tags_changed",
        ChangeKind::Disappeared => "resource_disappeared",
    }
}

#[cfg(test)]
#[path = "correlator_tests.rs"]
mod tests;
