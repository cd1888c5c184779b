// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A provider that answers every call successfully but does nothing,
//! useful for dry-run wiring and smoke tests that never need real
//! resources to exist.

use crate::provider::{Provider, ProviderError, ResourceFilter, ResourceSpec};
use async_trait::async_trait;
use recon_core::{Resource, ResourceId};
use std::collections::BTreeMap;

pub struct NoopProvider {
    name: String,
    region: String,
}

impl NoopProvider {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }
}

#[async_trait]
impl Provider for NoopProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn list_resources(&self, _filter: &ResourceFilter) -> Result<Vec<Resource>, ProviderError> {
        Ok(Vec::new())
    }

    async fn create_resource(&self, spec: &ResourceSpec) -> Result<Resource, ProviderError> {
        Ok(Resource {
            id: "noop".into(),
            provider: self.name.clone(),
            region: self.region.clone(),
            account: "noop".to_string(),
            resource_type: spec.resource_type.clone(),
            name: spec.name.clone(),
            status: "running".to_string(),
            tags: spec.tags.clone(),
            attrs: spec.attrs.clone(),
            observed_at: chrono::Utc::now(),
        })
    }

    async fn delete_resource(&self, _id: &ResourceId) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn tag_resource(
        &self,
        _id: &ResourceId,
        _tags: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
