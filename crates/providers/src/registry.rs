// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider registry: a mapping from provider name to implementation,
//! built once at startup and immutable thereafter. No mutable global
//! state, no interior mutability — adding or removing a provider means
//! constructing a new `ProviderMap`.

use crate::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderMapError {
    #[error("no provider registered under name {0:?}")]
    Unknown(String),
}

/// Immutable name → provider mapping, constructed once during startup
/// wiring and shared by `Arc` with the scanner and executor.
#[derive(Clone, Default)]
pub struct ProviderMap {
    providers: HashMap<String, Arc<dyn Provider>>,
}

pub struct ProviderMapBuilder {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderMap {
    pub fn builder() -> ProviderMapBuilder {
        ProviderMapBuilder {
            providers: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, ProviderMapError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderMapError::Unknown(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderMapBuilder {
    pub fn register(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    pub fn build(self) -> ProviderMap {
        ProviderMap {
            providers: self.providers,
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
