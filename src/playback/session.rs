//! Playback session state and the view exposed to the embedding UI.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::providers::{ContentRef, ProviderDescriptor};

/// Errors returned to the embedding UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The provider list is empty. Distinct from "every provider is dead",
    /// which still yields a provider.
    #[error("no providers configured")]
    NoProviders,

    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("playback session has been unmounted")]
    SessionClosed,
}

/// Where the current attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Embed rendered, waiting for its load signal.
    Loading,
    /// Embed reported a successful load.
    Ready,
}

/// State owned by one session task for the lifetime of one embed mount.
#[derive(Debug)]
pub(crate) struct PlaybackSession {
    pub id: Uuid,
    pub content: ContentRef,
    pub selected: ProviderDescriptor,
    pub phase: Phase,
    pub attempt: u64,
}

impl PlaybackSession {
    pub fn new(content: ContentRef, selected: ProviderDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            selected,
            phase: Phase::Loading,
            attempt: 0,
        }
    }

    pub fn view(&self) -> PlaybackView {
        PlaybackView {
            session_id: self.id,
            embed_url: self.selected.embed_url(&self.content),
            provider: self.selected.clone(),
            phase: self.phase,
            attempt: self.attempt,
        }
    }
}

/// What the UI renders: the active provider, its embed URL and whether a
/// spinner should be shown.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackView {
    pub session_id: Uuid,
    pub provider: ProviderDescriptor,
    pub embed_url: String,
    pub phase: Phase,
    /// Incremented every time a Loading phase starts.
    pub attempt: u64,
}

impl PlaybackView {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}
