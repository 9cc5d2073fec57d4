//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, sweeper and controllers produce:
//!     → tracing events (provider id, session id, failure counts)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → whatever metrics exporter the host installs
//! ```

pub mod logging;
pub mod metrics;
