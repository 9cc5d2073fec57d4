//! Startup orchestration.
//!
//! Builds the shared pieces in dependency order: health store, registry,
//! catalog and selector, then the playback controller. The recovery
//! sweeper is spawned separately so one-shot tools can skip it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::clock::{Clock, SystemClock};
use crate::config::FailoverConfig;
use crate::health::{HealthRegistry, HealthStore, JsonFileStore, RecoverySweeper};
use crate::lifecycle::Shutdown;
use crate::playback::PlaybackController;
use crate::providers::{FallbackSelector, ProviderCatalog};

/// Everything a host needs to mount playback sessions.
#[derive(Debug, Clone)]
pub struct Services {
    pub config: FailoverConfig,
    pub registry: Arc<HealthRegistry>,
    pub controller: PlaybackController,
}

impl Services {
    /// Wire up services backed by the configured JSON store and the system clock.
    pub fn from_config(config: FailoverConfig) -> Self {
        let store = Arc::new(JsonFileStore::new(&config.health.store_path));
        Self::with_store(config, store, Arc::new(SystemClock))
    }

    pub fn with_store(
        config: FailoverConfig,
        store: Arc<dyn HealthStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = Arc::new(HealthRegistry::new(&config.health, store, clock));
        let catalog = ProviderCatalog::from_config(&config.providers);
        if catalog.is_empty() {
            tracing::warn!("No providers configured");
        }
        let selector = FallbackSelector::new(registry.clone());
        let controller = PlaybackController::new(catalog, selector, &config.playback);

        tracing::info!(
            providers = controller.catalog().len(),
            failure_threshold = config.health.failure_threshold,
            load_timeout_ms = config.playback.load_timeout_ms,
            "Playback failover initialized"
        );

        Self {
            config,
            registry,
            controller,
        }
    }

    /// Start the process-wide recovery sweeper.
    pub fn spawn_sweeper(&self, shutdown: &Shutdown) -> JoinHandle<()> {
        RecoverySweeper::new(self.registry.clone(), self.config.health.sweep_tick())
            .spawn(shutdown.subscribe())
    }
}
