//! Per-provider health record.
//!
//! # States
//! - Alive: provider is eligible for selection
//! - Dead: provider is skipped by the fallback selector
//!
//! # State Transitions
//! ```text
//! Alive → Dead:  consecutive_failures >= failure_threshold
//! Dead  → Alive: any success, or the recovery sweep after recovery_interval
//! ```
//!
//! `is_dead` is a cached field derived from `consecutive_failures`. Every
//! mutation recomputes it so the two never drift apart.

use serde::{Deserialize, Serialize};

/// Health bookkeeping for one provider. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub consecutive_failures: u32,
    pub last_failure_at: Option<u64>,
    pub last_success_at: Option<u64>,
    pub is_dead: bool,
}

impl HealthRecord {
    /// Count a failed load attempt.
    pub fn record_failure(&mut self, now_ms: u64, failure_threshold: u32) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure_at = Some(now_ms);
        self.recompute(failure_threshold);
    }

    /// A successful load wipes the failure streak. `last_failure_at` is kept
    /// as history.
    pub fn record_success(&mut self, now_ms: u64) {
        self.consecutive_failures = 0;
        self.last_success_at = Some(now_ms);
        self.is_dead = false;
    }

    /// Re-derive `is_dead` from the failure count.
    pub fn recompute(&mut self, failure_threshold: u32) {
        self.is_dead = self.consecutive_failures >= failure_threshold;
    }

    /// True if the record is dead and its last failure is older than
    /// `recovery_interval_ms`. A dead record with no failure timestamp is
    /// always overdue.
    pub fn is_overdue(&self, now_ms: u64, recovery_interval_ms: u64) -> bool {
        if !self.is_dead {
            return false;
        }
        let since = self.last_failure_at.unwrap_or(0);
        now_ms.saturating_sub(since) > recovery_interval_ms
    }

    /// Clear the dead flag and the failure count, keeping timestamps.
    pub fn revive(&mut self) {
        self.consecutive_failures = 0;
        self.is_dead = false;
    }
}
