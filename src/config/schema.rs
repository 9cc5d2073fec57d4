//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! failover subsystem. All types derive Serde traits for deserialization
//! from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of consecutive failures before a provider is dead.
pub const FAILURE_THRESHOLD: u32 = 3;
/// Default watchdog duration for one load attempt.
pub const LOAD_TIMEOUT_MS: u64 = 15_000;
/// Default time a dead provider waits before the sweep revives it.
pub const RECOVERY_INTERVAL_MS: u64 = 30 * 60 * 1000;
/// Default period of the recovery sweep.
pub const HEALTH_SWEEP_TICK_MS: u64 = 60_000;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverConfig {
    /// Health tracking and recovery settings.
    pub health: HealthConfig,

    /// Playback session settings.
    pub playback: PlaybackConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Embed providers in fallback priority order.
    pub providers: Vec<ProviderConfig>,
}

/// Health registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Number of consecutive failures before marking a provider dead.
    pub failure_threshold: u32,

    /// How long a provider stays dead before the sweep revives it.
    pub recovery_interval_ms: u64,

    /// Period of the background recovery sweep.
    pub sweep_tick_ms: u64,

    /// Path of the JSON document that persists health records.
    pub store_path: String,
}

impl HealthConfig {
    pub fn sweep_tick(&self) -> Duration {
        Duration::from_millis(self.sweep_tick_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: FAILURE_THRESHOLD,
            recovery_interval_ms: RECOVERY_INTERVAL_MS,
            sweep_tick_ms: HEALTH_SWEEP_TICK_MS,
            store_path: "provider_health.json".to_string(),
        }
    }
}

/// Playback session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Watchdog duration for a single load attempt.
    pub load_timeout_ms: u64,
}

impl PlaybackConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: LOAD_TIMEOUT_MS,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format ("pretty" or "compact").
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// A single embed provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier.
    pub id: String,

    /// Name shown in the server picker.
    pub display_name: String,

    /// Whether the provider serves subtitles.
    #[serde(default)]
    pub supports_subtitles: bool,

    /// Embed URL pattern for movies, e.g. `https://host/embed/movie/{id}`.
    pub movie_url: String,

    /// Embed URL pattern for episodes, e.g. `https://host/embed/tv/{id}/{season}/{episode}`.
    pub tv_url: String,
}
