//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and returns every
//! problem found, not just the first. An empty provider list is accepted:
//! it surfaces later as "no providers configured".

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{FailoverConfig, ProviderConfig};
use crate::providers::descriptor::{ContentRef, PatternTemplate, UrlTemplate};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("health.failure_threshold must be at least 1")]
    ZeroThreshold,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("provider at index {0} has an empty id")]
    EmptyProviderId(usize),

    #[error("duplicate provider id '{0}'")]
    DuplicateProvider(String),

    #[error("provider '{provider}' {field} is missing the {{id}} placeholder")]
    MissingIdPlaceholder {
        provider: String,
        field: &'static str,
    },

    #[error("provider '{provider}' {field} does not render to an absolute URL: {reason}")]
    InvalidUrl {
        provider: String,
        field: &'static str,
        reason: String,
    },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.health.failure_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    if config.health.recovery_interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration("health.recovery_interval_ms"));
    }
    if config.health.sweep_tick_ms == 0 {
        errors.push(ValidationError::ZeroDuration("health.sweep_tick_ms"));
    }
    if config.playback.load_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("playback.load_timeout_ms"));
    }

    let mut seen = HashSet::new();
    for (index, provider) in config.providers.iter().enumerate() {
        if provider.id.trim().is_empty() {
            errors.push(ValidationError::EmptyProviderId(index));
            continue;
        }
        if !seen.insert(provider.id.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.id.clone()));
        }
        validate_pattern(provider, "movie_url", &provider.movie_url, &mut errors);
        validate_pattern(provider, "tv_url", &provider.tv_url, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_pattern(
    provider: &ProviderConfig,
    field: &'static str,
    pattern: &str,
    errors: &mut Vec<ValidationError>,
) {
    if !pattern.contains("{id}") {
        errors.push(ValidationError::MissingIdPlaceholder {
            provider: provider.id.clone(),
            field,
        });
    }

    let sample = if field == "tv_url" {
        ContentRef::episode("12345", 1, 1)
    } else {
        ContentRef::movie("12345")
    };
    let template = PatternTemplate::new(pattern, pattern);
    if let Err(e) = Url::parse(&template.render(&sample)) {
        errors.push(ValidationError::InvalidUrl {
            provider: provider.id.clone(),
            field,
            reason: e.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: &str) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            supports_subtitles: false,
            movie_url: format!("https://{id}.example/movie/{{id}}"),
            tv_url: format!("https://{id}.example/tv/{{id}}/{{season}}/{{episode}}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FailoverConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_provider_ids() {
        let mut config = FailoverConfig::default();
        config.providers = vec![provider("a"), provider("b"), provider("a")];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateProvider("a".into())]);
    }

    #[test]
    fn test_relative_pattern_rejected() {
        let mut config = FailoverConfig::default();
        let mut p = provider("a");
        p.movie_url = "/embed/{id}".into();
        config.providers = vec![p];

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidUrl { field: "movie_url", .. }]
        ));
    }

    #[test]
    fn test_zero_durations() {
        let mut config = FailoverConfig::default();
        config.playback.load_timeout_ms = 0;
        config.health.sweep_tick_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("sweep_tick_ms"));
    }
}
