//! Provider abstraction.
//!
//! # Responsibilities
//! - Represent a single third-party embed provider
//! - Build the embed URL for a piece of content
//!
//! Descriptors are supplied by the embedding application and are never
//! created or destroyed by the failover core; it only filters and orders them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

/// Kind of content being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Tv,
}

/// The content a playback session is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: String,
    pub kind: ContentKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl ContentRef {
    pub fn movie(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ContentKind::Movie,
            season: None,
            episode: None,
        }
    }

    pub fn episode(id: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            id: id.into(),
            kind: ContentKind::Tv,
            season: Some(season),
            episode: Some(episode),
        }
    }
}

/// Builds a provider's embed URL. The core never builds URLs itself.
pub trait UrlTemplate: Send + Sync {
    fn render(&self, content: &ContentRef) -> String;
}

impl<F> UrlTemplate for F
where
    F: Fn(&ContentRef) -> String + Send + Sync,
{
    fn render(&self, content: &ContentRef) -> String {
        self(content)
    }
}

/// Placeholder-based template: `{id}`, `{season}` and `{episode}` are
/// substituted. Episodes without a season/episode number default to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTemplate {
    movie: String,
    tv: String,
}

impl PatternTemplate {
    pub fn new(movie: impl Into<String>, tv: impl Into<String>) -> Self {
        Self {
            movie: movie.into(),
            tv: tv.into(),
        }
    }
}

impl UrlTemplate for PatternTemplate {
    fn render(&self, content: &ContentRef) -> String {
        match content.kind {
            ContentKind::Movie => self.movie.replace("{id}", &content.id),
            ContentKind::Tv => self
                .tv
                .replace("{id}", &content.id)
                .replace("{season}", &content.season.unwrap_or(1).to_string())
                .replace("{episode}", &content.episode.unwrap_or(1).to_string()),
        }
    }
}

/// A single embed provider.
#[derive(Clone)]
pub struct ProviderDescriptor {
    /// Stable unique identifier.
    pub id: String,
    /// Name shown in the server picker.
    pub display_name: String,
    /// Whether the provider serves subtitles.
    pub supports_subtitles: bool,
    template: Arc<dyn UrlTemplate>,
}

impl ProviderDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        supports_subtitles: bool,
        template: impl UrlTemplate + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            supports_subtitles,
            template: Arc::new(template),
        }
    }

    /// Embed URL for `content` on this provider.
    pub fn embed_url(&self, content: &ContentRef) -> String {
        self.template.render(content)
    }
}

impl From<&ProviderConfig> for ProviderDescriptor {
    fn from(config: &ProviderConfig) -> Self {
        Self::new(
            config.id.clone(),
            config.display_name.clone(),
            config.supports_subtitles,
            PatternTemplate::new(config.movie_url.clone(), config.tv_url.clone()),
        )
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("supports_subtitles", &self.supports_subtitles)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ProviderDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProviderDescriptor {}
