//! Shared fixtures for integration tests.

use std::sync::Arc;
use std::time::Duration;

use playback_failover::clock::ManualClock;
use playback_failover::config::{FailoverConfig, ProviderConfig};
use playback_failover::health::MemoryStore;
use playback_failover::playback::PlaybackView;
use playback_failover::Services;
use tokio::sync::watch;

pub const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

pub fn provider(id: &str) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        display_name: format!("Server {}", id.to_uppercase()),
        supports_subtitles: id == "a",
        movie_url: format!("https://{id}.example/embed/movie/{{id}}"),
        tv_url: format!("https://{id}.example/embed/tv/{{id}}/{{season}}/{{episode}}"),
    }
}

/// Services over an in-memory store and a manual clock.
pub fn services(ids: &[&str]) -> (Services, ManualClock) {
    let mut config = FailoverConfig::default();
    config.providers = ids.iter().map(|id| provider(id)).collect();

    let clock = ManualClock::new(1_700_000_000_000);
    let services = Services::with_store(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(clock.clone()),
    );
    (services, clock)
}

/// Wait until the view satisfies `predicate`, failing after a minute of
/// (paused) time.
#[allow(dead_code)]
pub async fn wait_for_view<F>(rx: &mut watch::Receiver<PlaybackView>, predicate: F) -> PlaybackView
where
    F: FnMut(&PlaybackView) -> bool,
{
    tokio::time::timeout(Duration::from_secs(60), rx.wait_for(predicate))
        .await
        .expect("view did not reach expected state")
        .expect("session ended")
        .clone()
}
