//! Playback subsystem.
//!
//! # Data Flow
//! ```text
//! UI mounts an embed
//!     → controller.rs start (selector picks provider)
//!     → session task renders embed URL, arms watchdog.rs
//!     → load signal  → registry.report_success → Ready
//!     → timeout      → registry.report_failure → next alive provider
//!     → MarkedDead   → re-select off the dead provider
//! UI unmounts
//!     → task ends, watchdog dropped
//! ```

pub mod controller;
pub mod session;
mod watchdog;

pub use controller::{PlaybackController, PlaybackHandle};
pub use session::{Phase, PlaybackError, PlaybackView};
