//! Fallback provider selection.
//!
//! Filters the configured providers down to the ones that are not dead,
//! keeping configuration order as the fallback priority. If every provider
//! is dead the first configured provider is returned anyway: the player is
//! never left with zero options. An empty configuration still yields an
//! empty list, which callers report as "no providers configured".

use std::sync::Arc;

use serde::Serialize;

use crate::health::{HealthRecord, HealthRegistry};
use crate::providers::descriptor::ProviderDescriptor;

/// A provider annotated with its health, for server pickers.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub id: String,
    pub display_name: String,
    pub supports_subtitles: bool,
    pub alive: bool,
    pub health: Option<HealthRecord>,
}

#[derive(Debug, Clone)]
pub struct FallbackSelector {
    registry: Arc<HealthRegistry>,
}

impl FallbackSelector {
    pub fn new(registry: Arc<HealthRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<HealthRegistry> {
        &self.registry
    }

    /// Providers usable right now, in priority order. Never empty for a
    /// non-empty input.
    pub fn alive_providers(&self, all: &[ProviderDescriptor]) -> Vec<ProviderDescriptor> {
        let alive: Vec<ProviderDescriptor> = all
            .iter()
            .filter(|p| !self.registry.is_dead(&p.id))
            .cloned()
            .collect();

        if alive.is_empty() {
            if let Some(first) = all.first() {
                tracing::debug!(
                    provider = %first.id,
                    "All providers dead, falling back to first configured provider"
                );
                return vec![first.clone()];
            }
        }
        alive
    }

    /// Candidates after `failed` timed out: the alive list without `failed`
    /// when something else is available, otherwise the alive list as is.
    pub fn next_after(&self, all: &[ProviderDescriptor], failed: &str) -> Vec<ProviderDescriptor> {
        let alive = self.alive_providers(all);
        let others: Vec<ProviderDescriptor> =
            alive.iter().filter(|p| p.id != failed).cloned().collect();
        if others.is_empty() {
            alive
        } else {
            others
        }
    }

    /// Every configured provider with its alive/dead annotation.
    pub fn annotated(&self, all: &[ProviderDescriptor]) -> Vec<ProviderStatus> {
        all.iter()
            .map(|p| ProviderStatus {
                id: p.id.clone(),
                display_name: p.display_name.clone(),
                supports_subtitles: p.supports_subtitles,
                alive: !self.registry.is_dead(&p.id),
                health: self.registry.record(&p.id),
            })
            .collect()
    }
}
