//! Shared provider health registry.
//!
//! # Responsibilities
//! - Track consecutive load failures per provider
//! - Flip providers dead at the failure threshold, alive on success
//! - Revive long-dead providers in bulk on each recovery sweep
//! - Write every mutation through to the health store
//! - Broadcast dead/alive transitions to playback sessions
//!
//! # Design Decisions
//! - Per-key locking (DashMap entries) makes each read-modify-write atomic,
//!   so concurrent failure reports are never lost
//! - Persistence is best-effort: store errors are logged, never returned
//! - Unknown providers are optimistically alive

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::clock::Clock;
use crate::config::HealthConfig;
use crate::health::record::HealthRecord;
use crate::health::store::{HealthSnapshot, HealthStore};
use crate::observability::metrics;

const EVENT_CAPACITY: usize = 64;

/// Health transitions observed by playback sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Provider crossed the failure threshold.
    MarkedDead(String),
    /// Provider is alive again (success or recovery sweep).
    Recovered(String),
    /// Registry was wiped.
    Cleared,
}

/// Health bookkeeping shared by every playback session.
pub struct HealthRegistry {
    records: DashMap<String, HealthRecord>,
    store: Arc<dyn HealthStore>,
    clock: Arc<dyn Clock>,
    failure_threshold: u32,
    recovery_interval_ms: u64,
    persist_lock: Mutex<()>,
    events: broadcast::Sender<HealthEvent>,
}

impl HealthRegistry {
    /// Create a registry, loading persisted records from `store`.
    ///
    /// A store that cannot be read yields an empty registry.
    pub fn new(config: &HealthConfig, store: Arc<dyn HealthStore>, clock: Arc<dyn Clock>) -> Self {
        let records = DashMap::new();
        match store.load() {
            Ok(snapshot) => {
                for (id, mut record) in snapshot {
                    record.recompute(config.failure_threshold);
                    records.insert(id, record);
                }
                tracing::info!(records = records.len(), "Loaded provider health records");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load provider health, assuming all alive");
            }
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            records,
            store,
            clock,
            failure_threshold: config.failure_threshold,
            recovery_interval_ms: config.recovery_interval_ms,
            persist_lock: Mutex::new(()),
            events,
        }
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn recovery_interval_ms(&self) -> u64 {
        self.recovery_interval_ms
    }

    /// Subscribe to dead/alive transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    /// Count a failed load attempt for `provider`.
    pub fn report_failure(&self, provider: &str) {
        let now = self.clock.now_ms();
        // The entry guard must be released before persisting, which iterates the map.
        let (failures, became_dead) = {
            let mut record = self.records.entry(provider.to_string()).or_default();
            let was_dead = record.is_dead;
            record.record_failure(now, self.failure_threshold);
            (record.consecutive_failures, !was_dead && record.is_dead)
        };

        metrics::record_provider_failure(provider);
        tracing::warn!(
            provider = %provider,
            consecutive_failures = failures,
            threshold = self.failure_threshold,
            "Provider load failure reported"
        );

        self.persist();

        if became_dead {
            tracing::warn!(provider = %provider, "Provider marked dead");
            metrics::record_provider_dead(provider, true);
            let _ = self.events.send(HealthEvent::MarkedDead(provider.to_string()));
        }
    }

    /// Reset `provider` to the alive, zero-failure state.
    pub fn report_success(&self, provider: &str) {
        let now = self.clock.now_ms();
        let was_dead = {
            let mut record = self.records.entry(provider.to_string()).or_default();
            let was_dead = record.is_dead;
            record.record_success(now);
            was_dead
        };

        metrics::record_provider_success(provider);
        tracing::debug!(provider = %provider, "Provider load success reported");

        self.persist();

        if was_dead {
            tracing::info!(provider = %provider, "Provider alive again after successful load");
            metrics::record_provider_dead(provider, false);
            let _ = self.events.send(HealthEvent::Recovered(provider.to_string()));
        }
    }

    /// Whether `provider` is currently dead. Unknown providers are alive.
    pub fn is_dead(&self, provider: &str) -> bool {
        self.records
            .get(provider)
            .map(|r| r.is_dead)
            .unwrap_or(false)
    }

    /// Copy of one provider's record, if it has ever been reported.
    pub fn record(&self, provider: &str) -> Option<HealthRecord> {
        self.records.get(provider).map(|r| *r)
    }

    /// Copy of every record.
    pub fn snapshot(&self) -> HealthSnapshot {
        self.records
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect()
    }

    /// Revive every dead provider whose last failure is older than the
    /// recovery interval. Returns whether anything changed.
    pub fn sweep_recoveries(&self, now_ms: u64) -> bool {
        let mut revived = Vec::new();
        for mut entry in self.records.iter_mut() {
            if entry.is_overdue(now_ms, self.recovery_interval_ms) {
                entry.revive();
                revived.push(entry.key().clone());
            }
        }

        if revived.is_empty() {
            return false;
        }

        tracing::info!(providers = ?revived, "Recovery sweep revived providers");
        metrics::record_recoveries(revived.len());
        self.persist();

        for provider in revived {
            metrics::record_provider_dead(&provider, false);
            let _ = self.events.send(HealthEvent::Recovered(provider));
        }
        true
    }

    /// Run a recovery sweep at the registry clock's current time.
    pub fn sweep_now(&self) -> bool {
        self.sweep_recoveries(self.clock.now_ms())
    }

    /// Forget every record.
    pub fn reset_all(&self) {
        self.records.clear();
        tracing::info!("Provider health registry reset");
        self.persist();
        let _ = self.events.send(HealthEvent::Cleared);
    }

    fn persist(&self) {
        // Snapshot under the lock so the newest state is always written last.
        let _guard = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.store.save(&self.snapshot()) {
            tracing::warn!(error = %e, "Failed to persist provider health");
        }
    }
}

impl std::fmt::Debug for HealthRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthRegistry")
            .field("records", &self.records.len())
            .field("failure_threshold", &self.failure_threshold)
            .field("recovery_interval_ms", &self.recovery_interval_ms)
            .finish()
    }
}
