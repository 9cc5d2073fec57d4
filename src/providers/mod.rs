//! Provider subsystem.
//!
//! # Data Flow
//! ```text
//! [[providers]] config (priority order)
//!     → descriptor.rs (ProviderDescriptor + UrlTemplate)
//!     → catalog.rs (ordered, id-unique list)
//!     → selector.rs (drop dead providers, keep order, never empty)
//!     → playback controller picks current or first alive
//! ```
//!
//! # Design Decisions
//! - Selector is stateless; the health registry holds all health state
//! - Order is the fallback priority
//! - All-dead falls back to the first configured provider

pub mod catalog;
pub mod descriptor;
pub mod selector;

pub use catalog::ProviderCatalog;
pub use descriptor::{ContentKind, ContentRef, PatternTemplate, ProviderDescriptor, UrlTemplate};
pub use selector::{FallbackSelector, ProviderStatus};
