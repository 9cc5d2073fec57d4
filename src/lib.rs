//! Embed provider health tracking and playback fallback.
//!
//! Tracks the liveness of third-party video embed providers, picks which
//! one a player should use, detects load failures with a watchdog, demotes
//! failing providers and revives them after a cooldown.

pub mod clock;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod playback;
pub mod providers;

pub use config::FailoverConfig;
pub use health::HealthRegistry;
pub use lifecycle::{Services, Shutdown};
pub use playback::{PlaybackController, PlaybackHandle};
