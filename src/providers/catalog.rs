//! Ordered provider list.
//!
//! Configuration order is the fallback priority. Id uniqueness is enforced
//! by config validation before a catalog is built.

use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::providers::descriptor::ProviderDescriptor;

/// Immutable, ordered list of providers.
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    providers: Arc<[ProviderDescriptor]>,
}

impl ProviderCatalog {
    pub fn from_config(configs: &[ProviderConfig]) -> Self {
        Self {
            providers: configs.iter().map(ProviderDescriptor::from).collect(),
        }
    }

    pub fn all(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
