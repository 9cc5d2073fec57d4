//! Playback session controller.
//!
//! # Responsibilities
//! - Pick the provider for a new embed mount
//! - Run a load watchdog per attempt and report the outcome to the registry
//! - Fall back silently to the next alive provider when an attempt times out
//! - Move off the current provider when another session marks it dead
//! - Honour manual provider switches from the server picker
//!
//! # State Machine
//! ```text
//! Selecting ──► Loading ──load signal──► Ready
//!                  │  ▲                    │
//!          timeout │  │ next alive         │ manual switch /
//!                  ▼  │                    │ provider marked dead
//!               report failure ◄───────────┘
//! ```
//!
//! Each mounted session is one task. The task owns the only watchdog for
//! the session, so transitions never overlap and a replaced watchdog can
//! never fire. Unmounting (or dropping every handle) ends the task and its
//! watchdog with it.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::Instrument;

use crate::config::PlaybackConfig;
use crate::health::HealthEvent;
use crate::observability::metrics;
use crate::playback::session::{Phase, PlaybackError, PlaybackSession, PlaybackView};
use crate::playback::watchdog::Watchdog;
use crate::providers::{ContentRef, FallbackSelector, ProviderCatalog, ProviderDescriptor, ProviderStatus};

enum Command {
    Loaded {
        provider: String,
    },
    Switch {
        provider: String,
        reply: oneshot::Sender<Result<(), PlaybackError>>,
    },
    Unmount,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Loaded { provider } => write!(f, "Loaded({provider})"),
            Command::Switch { provider, .. } => write!(f, "Switch({provider})"),
            Command::Unmount => write!(f, "Unmount"),
        }
    }
}

/// Creates playback sessions against a shared catalog and health registry.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    catalog: ProviderCatalog,
    selector: FallbackSelector,
    load_timeout: Duration,
}

impl PlaybackController {
    pub fn new(catalog: ProviderCatalog, selector: FallbackSelector, config: &PlaybackConfig) -> Self {
        Self {
            catalog,
            selector,
            load_timeout: config.load_timeout(),
        }
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    pub fn selector(&self) -> &FallbackSelector {
        &self.selector
    }

    /// The provider a new session would start on: `preferred` if it is
    /// alive, otherwise the first alive provider.
    pub fn resolve(&self, preferred: Option<&str>) -> Result<ProviderDescriptor, PlaybackError> {
        let alive = self.selector.alive_providers(self.catalog.all());
        if let Some(keep) = preferred.and_then(|id| alive.iter().find(|p| p.id == id)) {
            return Ok(keep.clone());
        }
        alive.into_iter().next().ok_or(PlaybackError::NoProviders)
    }

    /// Mount a session for `content` and start its first load attempt.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        content: ContentRef,
        preferred: Option<&str>,
    ) -> Result<PlaybackHandle, PlaybackError> {
        let selected = self.resolve(preferred)?;
        let session = PlaybackSession::new(content, selected);

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(session.view());
        let health = self.selector.registry().subscribe();

        let span = tracing::info_span!(
            "playback_session",
            session_id = %session.id,
            content_id = %session.content.id
        );
        let task = SessionTask {
            session,
            catalog: self.catalog.clone(),
            selector: self.selector.clone(),
            load_timeout: self.load_timeout,
            watchdog: Watchdog::default(),
            commands: commands_rx,
            health: Some(health),
            view: view_tx,
        };
        tokio::spawn(task.run().instrument(span));

        Ok(PlaybackHandle {
            commands: commands_tx,
            view: view_rx,
            catalog: self.catalog.clone(),
            selector: self.selector.clone(),
        })
    }
}

/// UI-side handle to a mounted session. Cloneable; the session ends when
/// `unmount` is called or the last handle is dropped.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<PlaybackView>,
    catalog: ProviderCatalog,
    selector: FallbackSelector,
}

impl PlaybackHandle {
    /// Current provider, embed URL and loading flag.
    pub fn view(&self) -> PlaybackView {
        self.view.borrow().clone()
    }

    /// Watch the view for changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackView> {
        self.view.clone()
    }

    /// Every configured provider annotated alive/dead, for the server picker.
    pub fn providers(&self) -> Vec<ProviderStatus> {
        self.selector.annotated(self.catalog.all())
    }

    /// Forward the embed's load signal. Signals from a provider other than
    /// the one currently loading are ignored as stale.
    pub fn mark_loaded(&self, provider: &str) -> Result<(), PlaybackError> {
        self.commands
            .send(Command::Loaded {
                provider: provider.to_string(),
            })
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// User-requested switch to `provider`, even if it is currently dead.
    pub async fn switch_to(&self, provider: &str) -> Result<(), PlaybackError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Switch {
                provider: provider.to_string(),
                reply,
            })
            .map_err(|_| PlaybackError::SessionClosed)?;
        response.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    /// End the session and wait until its task, and with it the watchdog,
    /// is gone.
    pub async fn unmount(mut self) {
        let _ = self.commands.send(Command::Unmount);
        while self.view.changed().await.is_ok() {}
    }
}

struct SessionTask {
    session: PlaybackSession,
    catalog: ProviderCatalog,
    selector: FallbackSelector,
    load_timeout: Duration,
    watchdog: Watchdog,
    commands: mpsc::UnboundedReceiver<Command>,
    health: Option<broadcast::Receiver<HealthEvent>>,
    view: watch::Sender<PlaybackView>,
}

impl SessionTask {
    async fn run(mut self) {
        self.enter_loading();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Loaded { provider }) => self.on_loaded(&provider),
                    Some(Command::Switch { provider, reply }) => {
                        let _ = reply.send(self.on_switch(&provider));
                    }
                    Some(Command::Unmount) | None => break,
                },
                _ = self.watchdog.expired() => self.on_timeout(),
                event = recv_health(&mut self.health) => match event {
                    Ok(HealthEvent::MarkedDead(provider)) => self.on_marked_dead(&provider),
                    Ok(HealthEvent::Recovered(_)) | Ok(HealthEvent::Cleared) => self.resume_if_stalled(),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Health events lagged, re-checking provider");
                        self.reselect_if_dead();
                    }
                    Err(RecvError::Closed) => self.health = None,
                },
            }
        }

        self.watchdog.disarm();
        tracing::debug!(provider = %self.session.selected.id, "Playback session unmounted");
    }

    fn enter_loading(&mut self) {
        self.session.phase = Phase::Loading;
        self.session.attempt += 1;
        self.watchdog.arm(self.load_timeout);

        tracing::info!(
            provider = %self.session.selected.id,
            attempt = self.session.attempt,
            embed_url = %self.session.selected.embed_url(&self.session.content),
            "Loading provider embed"
        );
        self.publish();
    }

    fn switch_provider(&mut self, next: ProviderDescriptor, reason: &'static str) {
        tracing::info!(
            from = %self.session.selected.id,
            to = %next.id,
            reason,
            "Switching provider"
        );
        metrics::record_switch(reason);
        self.session.selected = next;
        self.enter_loading();
    }

    fn on_loaded(&mut self, provider: &str) {
        if provider != self.session.selected.id {
            tracing::debug!(provider = %provider, "Ignoring stale load signal");
            return;
        }
        if self.session.phase == Phase::Ready {
            return;
        }

        self.watchdog.disarm();
        self.selector.registry().report_success(provider);
        self.session.phase = Phase::Ready;
        tracing::info!(provider = %provider, attempt = self.session.attempt, "Provider embed loaded");
        self.publish();
    }

    fn on_switch(&mut self, provider: &str) -> Result<(), PlaybackError> {
        let next = self
            .catalog
            .get(provider)
            .cloned()
            .ok_or_else(|| PlaybackError::UnknownProvider(provider.to_string()))?;
        self.switch_provider(next, "manual");
        Ok(())
    }

    fn on_timeout(&mut self) {
        let failed = self.session.selected.id.clone();
        tracing::warn!(
            provider = %failed,
            timeout_ms = self.load_timeout.as_millis() as u64,
            "Provider embed did not load in time"
        );
        self.selector.registry().report_failure(&failed);

        let next = self
            .selector
            .next_after(self.catalog.all(), &failed)
            .into_iter()
            .next();
        match next {
            Some(next) if next.id != failed => self.switch_provider(next, "timeout"),
            _ => {
                // Nothing else to try: stay on this provider, still loading,
                // until a load signal, a recovery or a manual switch.
                tracing::warn!(provider = %failed, "No alternative provider available");
                self.publish();
            }
        }
    }

    fn on_marked_dead(&mut self, provider: &str) {
        if provider == self.session.selected.id {
            self.reselect_if_dead();
        }
    }

    /// A stalled session (loading, watchdog spent) re-runs selection once
    /// any provider comes back: keep the current provider if it is alive,
    /// otherwise take the alive head.
    fn resume_if_stalled(&mut self) {
        if self.session.phase != Phase::Loading || self.watchdog.is_armed() {
            return;
        }
        let alive = self.selector.alive_providers(self.catalog.all());
        let current = &self.session.selected.id;
        if alive.iter().any(|p| &p.id == current) {
            tracing::info!(provider = %current, "Retrying provider after recovery");
            self.enter_loading();
        } else if let Some(next) = alive.into_iter().next() {
            self.switch_provider(next, "recovered");
        }
    }

    /// Re-run selection if the current provider has been marked dead.
    fn reselect_if_dead(&mut self) {
        let current = self.session.selected.id.clone();
        if !self.selector.registry().is_dead(&current) {
            return;
        }
        let alive = self.selector.alive_providers(self.catalog.all());
        if alive.iter().any(|p| p.id == current) {
            return;
        }
        if let Some(next) = alive.into_iter().next() {
            self.switch_provider(next, "dead");
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.session.view());
    }
}

async fn recv_health(
    health: &mut Option<broadcast::Receiver<HealthEvent>>,
) -> Result<HealthEvent, RecvError> {
    match health {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
