//! Periodic recovery sweep.
//!
//! One sweeper runs per process, independent of playback sessions, and only
//! stops on the shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::health::registry::HealthRegistry;

pub struct RecoverySweeper {
    registry: Arc<HealthRegistry>,
    tick: Duration,
}

impl RecoverySweeper {
    pub fn new(registry: Arc<HealthRegistry>, tick: Duration) -> Self {
        Self { registry, tick }
    }

    /// Spawn the sweep loop on the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            tick_ms = self.tick.as_millis() as u64,
            recovery_interval_ms = self.registry.recovery_interval_ms(),
            "Recovery sweeper starting"
        );

        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.registry.sweep_now() {
                        tracing::debug!("Recovery sweep changed provider health");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Recovery sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
