//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → open health store → build registry, catalog, controller
//!     → spawn recovery sweeper
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C → broadcast → sweeper exits
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Services;
