//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Playback watchdog expiry / embed load signal
//!     → registry.rs report_failure / report_success
//!     → record.rs (count failures, derive dead flag)
//!     → store.rs (write-through persistence)
//!     → HealthEvent broadcast to sessions
//!
//! Periodic timer (sweeper.rs):
//!     → registry.rs sweep_recoveries
//!     → overdue dead providers revived in bulk
//! ```
//!
//! # Design Decisions
//! - Alive → Dead after `failure_threshold` consecutive failures
//! - Dead → Alive on any success, or after `recovery_interval` via the sweep
//! - No backoff: the recovery interval is the only cooldown
//! - Health state is per provider and shared by every session

pub mod record;
pub mod registry;
pub mod store;
pub mod sweeper;

pub use record::HealthRecord;
pub use registry::{HealthEvent, HealthRegistry};
pub use store::{HealthSnapshot, HealthStore, JsonFileStore, MemoryStore, StoreError, STORAGE_NAMESPACE};
pub use sweeper::RecoverySweeper;
