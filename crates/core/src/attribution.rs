// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attribution of observed drift to the actor that most likely caused it.

use crate::observation::ChangeKind;
use crate::resource::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A drift event as seen by the store: something changed about a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftEvent {
    pub resource_id: ResourceId,
    pub timestamp: DateTime<Utc>,
    pub kind: ChangeKind,
}

/// One entry from an external activity feed (e.g. a CloudTrail event).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub api_name: String,
    pub timestamp: DateTime<Utc>,
    pub resource_id: Option<String>,
    pub resource_name: Option<String>,
    pub principal: String,
    pub principal_type: String,
    pub source_ip: String,
    pub user_agent: String,
    pub request_id: String,
}

/// Who (or what) performed the action that caused drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Human,
    Service,
    Automation,
    Unknown,
}

/// How the attribution was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMethod {
    Cloudtrail,
    Heuristic,
    Manual,
    Unknown,
}

/// The (actor, action, time) triple most likely responsible for a drift event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribution {
    pub resource_id: ResourceId,
    pub actor: String,
    pub actor_type: ActorType,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub source_ip: String,
    pub user_agent: String,
    pub request_id: String,
    pub confidence: f64,
    pub method: AttributionMethod,
}
