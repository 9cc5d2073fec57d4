//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FailoverConfig (validated, immutable)
//!     → providers become a ProviderCatalog, health/playback settings
//!       are handed to the registry and controllers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    FailoverConfig, HealthConfig, ObservabilityConfig, PlaybackConfig, ProviderConfig,
    FAILURE_THRESHOLD, HEALTH_SWEEP_TICK_MS, LOAD_TIMEOUT_MS, RECOVERY_INTERVAL_MS,
};
