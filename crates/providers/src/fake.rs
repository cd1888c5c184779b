// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provider for deterministic testing.

use crate::provider::{Provider, ProviderError, ResourceFilter, ResourceSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use recon_core::{Resource, ResourceId};
use std::collections::BTreeMap;

/// Recorded call to [`FakeProvider`].
#[derive(Debug, Clone)]
pub enum ProviderCall {
    List,
    Create { name: String },
    Delete { id: ResourceId },
    Tag { id: ResourceId },
}

struct FakeState {
    resources: BTreeMap<String, Resource>,
    calls: Vec<ProviderCall>,
    create_error: Option<String>,
    delete_error: Option<String>,
    tag_error: Option<String>,
    next_id: u64,
}

/// Fake provider for testing: in-memory resource table, programmable
/// errors, and a recorded call log.
pub struct FakeProvider {
    name: String,
    region: String,
    inner: Mutex<FakeState>,
}

impl FakeProvider {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            inner: Mutex::new(FakeState {
                resources: BTreeMap::new(),
                calls: Vec::new(),
                create_error: None,
                delete_error: None,
                tag_error: None,
                next_id: 1,
            }),
        }
    }

    pub fn seed(&self, resource: Resource) {
        self.inner
            .lock()
            .resources
            .insert(resource.id.as_str().to_string(), resource);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_create_error(&self, message: impl Into<String>) {
        self.inner.lock().create_error = Some(message.into());
    }

    pub fn set_delete_error(&self, message: impl Into<String>) {
        self.inner.lock().delete_error = Some(message.into());
    }

    pub fn set_tag_error(&self, message: impl Into<String>) {
        self.inner.lock().tag_error = Some(message.into());
    }

    pub fn has_resource(&self, id: &ResourceId) -> bool {
        self.inner.lock().resources.contains_key(id.as_str())
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn list_resources(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, ProviderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProviderCall::List);
        let matches = inner
            .resources
            .values()
            .filter(|r| {
                filter
                    .resource_type
                    .as_ref()
                    .is_none_or(|t| &r.resource_type == t)
            })
            .filter(|r| filter.tags.iter().all(|(k, v)| r.tags.get(k) == Some(v)))
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn create_resource(&self, spec: &ResourceSpec) -> Result<Resource, ProviderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProviderCall::Create {
            name: spec.name.clone(),
        });
        if let Some(message) = inner.create_error.take() {
            return Err(ProviderError::Failed(message));
        }

        let id = format!("fake-{}", inner.next_id);
        inner.next_id += 1;

        let resource = Resource {
            id: id.clone().into(),
            provider: self.name.clone(),
            region: self.region.clone(),
            account: "fake-account".to_string(),
            resource_type: spec.resource_type.clone(),
            name: spec.name.clone(),
            status: "running".to_string(),
            tags: spec.tags.clone(),
            attrs: spec.attrs.clone(),
            observed_at: chrono::Utc::now(),
        };
        inner.resources.insert(id, resource.clone());
        Ok(resource)
    }

    async fn delete_resource(&self, id: &ResourceId) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProviderCall::Delete { id: id.clone() });
        if let Some(message) = inner.delete_error.take() {
            return Err(ProviderError::Failed(message));
        }
        inner
            .resources
            .remove(id.as_str())
            .ok_or_else(|| ProviderError::NotFound(id.as_str().to_string()))?;
        Ok(())
    }

    async fn tag_resource(
        &self,
        id: &ResourceId,
        tags: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock();
        inner.calls.push(ProviderCall::Tag { id: id.clone() });
        if let Some(message) = inner.tag_error.take() {
            return Err(ProviderError::Failed(message));
        }
        let resource = inner
            .resources
            .get_mut(id.as_str())
            .ok_or_else(|| ProviderError::NotFound(id.as_str().to_string()))?;
        resource.tags.extend(tags.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
