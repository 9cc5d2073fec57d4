//! Metrics collection.
//!
//! # Metrics
//! - `playback_provider_failures_total` (counter): load timeouts by provider
//! - `playback_provider_successes_total` (counter): successful loads by provider
//! - `playback_provider_dead` (gauge): 1=dead, 0=alive
//! - `playback_provider_switches_total` (counter): provider changes by reason
//! - `playback_recoveries_total` (counter): providers revived by the sweep
//!
//! The library only records; installing an exporter is up to the host.

use metrics::{counter, gauge};

pub fn record_provider_failure(provider: &str) {
    counter!("playback_provider_failures_total", "provider" => provider.to_string()).increment(1);
}

pub fn record_provider_success(provider: &str) {
    counter!("playback_provider_successes_total", "provider" => provider.to_string()).increment(1);
}

pub fn record_provider_dead(provider: &str, dead: bool) {
    let value = if dead { 1.0 } else { 0.0 };
    gauge!("playback_provider_dead", "provider" => provider.to_string()).set(value);
}

pub fn record_switch(reason: &'static str) {
    counter!("playback_provider_switches_total", "reason" => reason).increment(1);
}

pub fn record_recoveries(count: usize) {
    counter!("playback_recoveries_total").increment(count as u64);
}
