// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource identity and the action vocabulary policy decisions are drawn from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Provider-assigned resource identifier (e.g. an EC2 instance id).
    pub struct ResourceId;
}

/// Well-known tag keys with recognized policy semantics.
pub mod tag_keys {
    pub const OWNER: &str = "owner";
    pub const BLESSED: &str = "blessed";
    pub const MANAGED: &str = "managed";
    pub const ENVIRONMENT: &str = "environment";
    pub const TEAM: &str = "team";
    pub const NAME: &str = "name";
}

/// The identity tuple that determines whether two resources are "the same".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub id: ResourceId,
    pub provider: String,
    pub region: String,
    pub account: String,
}

/// A single observed cloud resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub provider: String,
    pub region: String,
    pub account: String,
    pub resource_type: String,
    pub name: String,
    pub status: String,
    pub tags: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
    pub observed_at: DateTime<Utc>,
}

impl Resource {
    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity {
            id: self.id.clone(),
            provider: self.provider.clone(),
            region: self.region.clone(),
            account: self.account.clone(),
        }
    }

    /// Two resources are the same resource iff their identity tuples match.
    /// Deliberately narrower than derived `PartialEq`, which also compares
    /// the mutable fields used for change detection.
    pub fn same_identity(&self, other: &Resource) -> bool {
        self.id == other.id
            && self.provider == other.provider
            && self.region == other.region
            && self.account == other.account
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// System has taken responsibility for this resource.
    pub fn is_managed(&self) -> bool {
        self.tag(tag_keys::MANAGED)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Destructive action is forbidden on this resource regardless of owner.
    pub fn is_blessed(&self) -> bool {
        self.tag(tag_keys::BLESSED)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// No owner/team tag: orphan for policy purposes.
    pub fn is_orphan(&self) -> bool {
        self.tag(tag_keys::OWNER).is_none() && self.tag(tag_keys::TEAM).is_none()
    }

    /// Fields considered "important" for safety severity escalation:
    /// production-like environment, a critical/important name, or a
    /// stateful resource type (rds, s3).
    pub fn is_important(&self) -> bool {
        let env_important = self
            .tag(tag_keys::ENVIRONMENT)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "production" | "prod"))
            .unwrap_or(false);
        let name_important = self
            .tag(tag_keys::NAME)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "critical" | "important"))
            .unwrap_or(false);
        let type_important = matches!(self.resource_type.as_str(), "rds" | "s3");
        env_important || name_important || type_important
    }

    /// Fields that matter for drift detection, excluding tags (compared
    /// separately so a tags-only change is classified as `TagsChanged`).
    fn non_tag_fields_eq(&self, other: &Resource) -> bool {
        self.resource_type == other.resource_type
            && self.name == other.name
            && self.status == other.status
            && self.attrs == other.attrs
    }

    /// Whole-resource equality used by change-event derivation: identity,
    /// non-tag fields, and tags must all match for "no change" to hold.
    pub fn observably_equal(&self, other: &Resource) -> bool {
        self.same_identity(other) && self.non_tag_fields_eq(other) && self.tags == other.tags
    }

    pub fn tags_changed_only(&self, other: &Resource) -> bool {
        self.non_tag_fields_eq(other) && self.tags != other.tags
    }
}

/// The action a [`Decision`](crate::decision::Decision) asks the executor to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
    Terminate,
    Tag,
    Notify,
    Noop,
}

impl Action {
    /// `delete` or `terminate`.
    pub fn is_destructive(self) -> bool {
        matches!(self, Action::Delete | Action::Terminate)
    }

    /// Destructive actions and blessed-resource mutations require a human
    /// (or configured confirmer) to say yes before the executor proceeds.
    pub fn requires_confirmation(self, is_blessed: bool) -> bool {
        self.is_destructive() || is_blessed
    }

    /// Whether the rollback manager can construct a reverse action.
    /// See [`crate::rollback::ReverseAction`] for what the reverse actually is.
    pub fn is_reversible(self) -> bool {
        matches!(self, Action::Create | Action::Tag | Action::Noop)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
