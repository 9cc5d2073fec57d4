//! End-to-end playback fallback scenarios on paused Tokio time.

use std::sync::Arc;
use std::time::Duration;

use playback_failover::clock::SystemClock;
use playback_failover::config::FailoverConfig;
use playback_failover::health::JsonFileStore;
use playback_failover::playback::{Phase, PlaybackError};
use playback_failover::providers::ContentRef;
use playback_failover::Services;
use tokio::time::sleep;

mod common;

use common::{services, wait_for_view, LOAD_TIMEOUT};

fn kill(services: &Services, id: &str) {
    for _ in 0..services.registry.failure_threshold() {
        services.registry.report_failure(id);
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_starts_on_first_alive_provider() {
    let (services, _) = services(&["a", "b"]);

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    let view = handle.view();

    assert_eq!(view.provider.id, "a");
    assert_eq!(view.embed_url, "https://a.example/embed/movie/603");
    assert!(view.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_preferred_provider_kept_only_while_alive() {
    let (services, _) = services(&["a", "b", "c"]);

    let handle = services
        .controller
        .start(ContentRef::episode("1399", 2, 3), Some("b"))
        .unwrap();
    assert_eq!(handle.view().provider.id, "b");
    assert_eq!(handle.view().embed_url, "https://b.example/embed/tv/1399/2/3");

    kill(&services, "c");
    let handle = services
        .controller
        .start(ContentRef::movie("603"), Some("c"))
        .unwrap();
    assert_eq!(handle.view().provider.id, "a");
}

#[tokio::test(start_paused = true)]
async fn test_load_signal_resets_failures_and_cancels_watchdog() {
    let (services, _) = services(&["a", "b"]);
    services.registry.report_failure("a");
    services.registry.report_failure("a");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    handle.mark_loaded("a").unwrap();

    let mut rx = handle.subscribe();
    let view = wait_for_view(&mut rx, |v| v.phase == Phase::Ready).await;
    assert_eq!(view.provider.id, "a");

    sleep(LOAD_TIMEOUT * 4).await;
    let record = services.registry.record("a").unwrap();
    assert_eq!(record.consecutive_failures, 0);
    assert!(record.last_success_at.is_some());
    assert_eq!(handle.view().phase, Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_slow_load_is_not_penalized() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();

    sleep(LOAD_TIMEOUT - Duration::from_millis(100)).await;
    handle.mark_loaded("a").unwrap();
    sleep(LOAD_TIMEOUT * 2).await;

    assert_eq!(services.registry.record("a").unwrap().consecutive_failures, 0);
    let view = handle.view();
    assert_eq!(view.provider.id, "a");
    assert_eq!(view.phase, Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_falls_back_to_next_provider() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();

    let mut rx = handle.subscribe();
    let view = wait_for_view(&mut rx, |v| v.provider.id == "b").await;

    assert!(view.is_loading());
    assert_eq!(view.attempt, 2);
    assert_eq!(view.embed_url, "https://b.example/embed/movie/603");
    let record = services.registry.record("a").unwrap();
    assert_eq!(record.consecutive_failures, 1);
    assert!(!record.is_dead);
}

#[tokio::test(start_paused = true)]
async fn test_switch_cancels_previous_watchdog() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();

    handle.switch_to("b").await.unwrap();
    handle.mark_loaded("b").unwrap();
    sleep(LOAD_TIMEOUT + Duration::from_secs(5)).await;

    assert!(services.registry.record("a").is_none(), "stale watchdog fired");
    let view = handle.view();
    assert_eq!(view.provider.id, "b");
    assert_eq!(view.phase, Phase::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_provider_marked_dead_elsewhere_triggers_switch() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    assert_eq!(handle.view().provider.id, "a");

    kill(&services, "a");
    assert!(services.registry.is_dead("a"));

    let mut rx = handle.subscribe();
    let view = wait_for_view(&mut rx, |v| v.provider.id == "b").await;
    assert!(view.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_ready_session_leaves_provider_marked_dead() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    handle.mark_loaded("a").unwrap();

    let mut rx = handle.subscribe();
    wait_for_view(&mut rx, |v| v.phase == Phase::Ready).await;

    kill(&services, "a");
    let view = wait_for_view(&mut rx, |v| v.provider.id == "b").await;
    assert_eq!(view.phase, Phase::Loading);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_failure_crossing_threshold_switches() {
    let (services, _) = services(&["a", "b"]);
    services.registry.report_failure("a");
    services.registry.report_failure("a");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    let mut rx = handle.subscribe();
    wait_for_view(&mut rx, |v| v.provider.id == "b").await;

    assert!(services.registry.is_dead("a"));
}

#[tokio::test(start_paused = true)]
async fn test_all_dead_falls_back_to_first_and_stalls() {
    let (services, _) = services(&["a", "b"]);
    kill(&services, "a");
    kill(&services, "b");

    let alive = services
        .controller
        .selector()
        .alive_providers(services.controller.catalog().all());
    assert_eq!(alive.len(), 1);
    assert_eq!(alive[0].id, "a");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    assert_eq!(handle.view().provider.id, "a");

    sleep(LOAD_TIMEOUT * 4).await;
    let view = handle.view();
    assert_eq!(view.provider.id, "a");
    assert!(view.is_loading());
    // One timeout only: a stalled session does not keep re-arming.
    assert_eq!(services.registry.record("a").unwrap().consecutive_failures, 4);

    // A late load signal still counts.
    handle.mark_loaded("a").unwrap();
    let mut rx = handle.subscribe();
    wait_for_view(&mut rx, |v| v.phase == Phase::Ready).await;
    assert!(!services.registry.is_dead("a"));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_session_resumes_on_alive_head() {
    let (services, clock) = services(&["a", "b", "c"]);
    for id in ["a", "b", "c"] {
        kill(&services, id);
    }

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    sleep(LOAD_TIMEOUT + Duration::from_secs(1)).await;
    assert_eq!(handle.view().provider.id, "a");

    // Keep "a" dead through the sweep while "b" and "c" become overdue.
    let half = services.registry.recovery_interval_ms() / 2;
    clock.advance(half);
    services.registry.report_failure("a");
    clock.advance(half + 1);
    assert!(services.registry.sweep_now());
    assert!(services.registry.is_dead("a"));

    let mut rx = handle.subscribe();
    let view = wait_for_view(&mut rx, |v| v.attempt == 2).await;
    assert_eq!(view.provider.id, "b");
    assert!(view.is_loading());

    // Later recovery events do not move a session that is loading again.
    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.view().provider.id, "b");
    assert_eq!(handle.view().attempt, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_session_retries_current_provider_once_alive() {
    let (services, _) = services(&["a"]);
    kill(&services, "a");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    sleep(LOAD_TIMEOUT + Duration::from_secs(1)).await;
    assert_eq!(handle.view().attempt, 1);

    // Another session loads "a" successfully.
    services.registry.report_success("a");

    let mut rx = handle.subscribe();
    let view = wait_for_view(&mut rx, |v| v.attempt == 2).await;
    assert_eq!(view.provider.id, "a");
    assert!(view.is_loading());

    // The watchdog is armed again.
    sleep(LOAD_TIMEOUT + Duration::from_secs(1)).await;
    assert_eq!(services.registry.record("a").unwrap().consecutive_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_session_resumes_after_reset() {
    let (services, _) = services(&["a", "b"]);
    kill(&services, "a");
    kill(&services, "b");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    sleep(LOAD_TIMEOUT + Duration::from_secs(1)).await;

    services.registry.reset_all();

    let mut rx = handle.subscribe();
    let view = wait_for_view(&mut rx, |v| v.attempt == 2).await;
    assert_eq!(view.provider.id, "a");
    assert!(view.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_manual_switch_rules() {
    let (services, _) = services(&["a", "b"]);
    kill(&services, "b");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();

    assert_eq!(
        handle.switch_to("nope").await,
        Err(PlaybackError::UnknownProvider("nope".into()))
    );

    // Dead providers can still be picked by hand.
    handle.switch_to("b").await.unwrap();
    let view = handle.view();
    assert_eq!(view.provider.id, "b");
    assert!(view.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_stale_load_signal_ignored() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();

    handle.switch_to("b").await.unwrap();
    handle.mark_loaded("a").unwrap();
    // Round-trip through the session so the load signal has been handled.
    handle.switch_to("b").await.unwrap();

    let view = handle.view();
    assert_eq!(view.provider.id, "b");
    assert!(view.is_loading());
    assert!(services.registry.record("a").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unmount_cancels_watchdog() {
    let (services, _) = services(&["a", "b"]);
    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    let other = handle.clone();

    handle.unmount().await;
    sleep(LOAD_TIMEOUT * 4).await;

    assert!(services.registry.record("a").is_none());
    assert_eq!(other.mark_loaded("a"), Err(PlaybackError::SessionClosed));
    assert_eq!(other.switch_to("b").await, Err(PlaybackError::SessionClosed));
}

#[tokio::test(start_paused = true)]
async fn test_no_providers_configured() {
    let (services, _) = services(&[]);
    let err = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap_err();
    assert_eq!(err, PlaybackError::NoProviders);
}

#[tokio::test(start_paused = true)]
async fn test_provider_list_annotation() {
    let (services, _) = services(&["a", "b", "c"]);
    kill(&services, "b");

    let handle = services
        .controller
        .start(ContentRef::movie("603"), None)
        .unwrap();
    let statuses = handle.providers();

    let alive: Vec<_> = statuses.iter().map(|s| (s.id.as_str(), s.alive)).collect();
    assert_eq!(alive, [("a", true), ("b", false), ("c", true)]);
    assert!(statuses[0].supports_subtitles);
    assert_eq!(statuses[1].display_name, "Server B");
}

#[test]
fn test_health_survives_restart() {
    let path = std::env::temp_dir().join(format!("health-{}.json", uuid::Uuid::new_v4()));
    let mut config = FailoverConfig::default();
    config.providers = vec![common::provider("a"), common::provider("b")];

    let first = Services::with_store(
        config.clone(),
        Arc::new(JsonFileStore::new(&path)),
        Arc::new(SystemClock),
    );
    kill(&first, "a");
    drop(first);

    let second = Services::with_store(config, Arc::new(JsonFileStore::new(&path)), Arc::new(SystemClock));
    assert!(second.registry.is_dead("a"));
    assert_eq!(second.controller.resolve(None).unwrap().id, "b");

    std::fs::remove_file(&path).unwrap_or_default();
}
