//! Provider registry for runtime provider lookup.
//!
//! A name-indexed registry of boxed LLM providers, populated once at startup
//! and read-only afterwards. Per-request selection happens in
//! [`super::manager::ProviderManager`], never by mutating the registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::box_provider::BoxLlmProvider;

/// Registry of available LLM providers, indexed by name.
///
/// Providers are stored behind `Arc` so a request can hold the backend it
/// resolved without borrowing the registry for the call's duration.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<BoxLlmProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under the given name.
    ///
    /// If a provider with this name already exists, it is replaced.
    pub fn register(&mut self, name: impl Into<String>, provider: BoxLlmProvider) {
        self.providers.insert(name.into(), Arc::new(provider));
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<BoxLlmProvider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list_names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
