// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability seam the executor and scanners call through to reach a
//! cloud account. Implementations are polymorphic behind this trait; the
//! core never matches on a concrete provider type.

use async_trait::async_trait;
use recon_core::{Resource, ResourceId};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("provider call failed: {0}")]
    Failed(String),
    #[error("provider call failed (retryable): {0}")]
    Retryable(String),
}

impl ProviderError {
    /// Whether the caller should retry this specific failure. Only the
    /// provider itself knows this (throttling, transient network errors);
    /// everything else is surfaced as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Retryable(_))
    }
}

/// A filter passed to [`Provider::list_resources`]. An empty filter matches
/// everything the provider can see in its configured region/account.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub resource_type: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// The desired shape of a resource the executor asks a provider to create.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub resource_type: String,
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
}

/// Capability set exposed to the executor and scanners: list, create,
/// delete, tag. The core holds a mapping from provider name to
/// implementation and never depends on a concrete provider type.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Stable provider name, e.g. `"aws"`, `"gcp"`.
    fn name(&self) -> &str;

    /// The region this instance is scoped to.
    fn region(&self) -> &str;

    async fn list_resources(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, ProviderError>;

    async fn create_resource(&self, spec: &ResourceSpec) -> Result<Resource, ProviderError>;

    async fn delete_resource(&self, id: &ResourceId) -> Result<(), ProviderError>;

    async fn tag_resource(
        &self,
        id: &ResourceId,
        tags: &BTreeMap<String, String>,
    ) -> Result<(), ProviderError>;
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
