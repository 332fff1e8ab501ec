//! External service configuration
//!
//! One value carries everything the client core needs to reach its four
//! upstreams: the primary catalog, the Last.fm metadata API, the
//! MusicBrainz cross-reference API, and the encyclopedia summary
//! endpoint. Credentials are expected to arrive from the environment or
//! the host platform, never from constants in the binary.
//!
//! ```
//! use core_runtime::config::ServiceConfig;
//!
//! let config = ServiceConfig::new()
//!     .with_lastfm_api_key("your_lastfm_api_key")
//!     .with_musicbrainz_user_agent("MyStatsApp/1.0 (contact@example.com)")
//!     .with_rate_limit_delay_ms(1000);
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};

const DEFAULT_CATALOG_BASE: &str = "https://api.spotify.com/v1";
const DEFAULT_ENCYCLOPEDIA_BASE: &str = "https://en.wikipedia.org/api/rest_v1";

/// Ceiling on the inter-request delay; anything above this is a typo.
const MAX_RATE_LIMIT_DELAY_MS: u64 = 60_000;

/// Where the client core finds its upstream services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Primary catalog API base URL.
    pub catalog_base_url: String,

    /// Last.fm API key. Without one the biography/statistics enrichment
    /// track is unavailable.
    pub lastfm_api_key: Option<String>,

    /// Identifying user agent for MusicBrainz, `AppName/Version (Contact)`.
    /// Without one cross-reference resolution is unavailable.
    pub musicbrainz_user_agent: Option<String>,

    /// Encyclopedia page-summary API base URL.
    pub encyclopedia_base_url: String,

    /// Minimum milliseconds between requests to either metadata service.
    /// MusicBrainz expects about one request per second from clients;
    /// the same spacing is applied to Last.fm.
    pub rate_limit_delay_ms: u64,

    /// Delay step, per list position, between related-artist resolutions.
    ///
    /// Spreads the fan-out over the similar-artists list so downstream
    /// services are not hit in a single burst. Tuning, not correctness.
    pub related_artist_stagger_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: DEFAULT_CATALOG_BASE.to_string(),
            lastfm_api_key: None,
            musicbrainz_user_agent: None,
            encyclopedia_base_url: DEFAULT_ENCYCLOPEDIA_BASE.to_string(),
            rate_limit_delay_ms: 1000,
            related_artist_stagger_ms: 150,
        }
    }
}

impl ServiceConfig {
    /// Default endpoints, no credentials.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_base_url = url.into();
        self
    }

    pub fn with_lastfm_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.lastfm_api_key = Some(api_key.into());
        self
    }

    pub fn with_musicbrainz_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.musicbrainz_user_agent = Some(user_agent.into());
        self
    }

    pub fn with_encyclopedia_base_url(mut self, url: impl Into<String>) -> Self {
        self.encyclopedia_base_url = url.into();
        self
    }

    pub fn with_rate_limit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.rate_limit_delay_ms = delay_ms;
        self
    }

    pub fn with_related_artist_stagger_ms(mut self, delay_ms: u64) -> Self {
        self.related_artist_stagger_ms = delay_ms;
        self
    }

    /// Rejects configurations that would fail at the first request.
    pub fn validate(&self) -> Result<()> {
        if self.catalog_base_url.is_empty() {
            return Err(Error::Config("catalog base URL is empty".to_string()));
        }
        if self.encyclopedia_base_url.is_empty() {
            return Err(Error::Config("encyclopedia base URL is empty".to_string()));
        }

        if let Some(ua) = self.musicbrainz_user_agent.as_deref() {
            if !is_plausible_user_agent(ua) {
                return Err(Error::Config(format!(
                    "MusicBrainz user agent {:?} does not look like 'AppName/Version (Contact)'",
                    ua
                )));
            }
        }

        if self.rate_limit_delay_ms == 0 || self.rate_limit_delay_ms > MAX_RATE_LIMIT_DELAY_MS {
            return Err(Error::Config(format!(
                "rate limit delay must be within 1..={} ms, got {}",
                MAX_RATE_LIMIT_DELAY_MS, self.rate_limit_delay_ms
            )));
        }

        Ok(())
    }

    pub fn has_lastfm(&self) -> bool {
        self.lastfm_api_key.is_some()
    }

    pub fn has_musicbrainz(&self) -> bool {
        self.musicbrainz_user_agent.is_some()
    }
}

/// MusicBrainz wants `AppName/Version (Contact)`; checking for the
/// separator and the parenthesized contact catches the usual mistakes.
fn is_plausible_user_agent(ua: &str) -> bool {
    !ua.is_empty() && ua.contains('/') && ua.contains('(') && ua.contains(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.has_lastfm());
        assert!(!config.has_musicbrainz());
    }

    #[test]
    fn test_builder_sets_keys() {
        let config = ServiceConfig::new()
            .with_lastfm_api_key("key")
            .with_musicbrainz_user_agent("StatsApp/1.0 (contact@example.com)");

        assert!(config.has_lastfm());
        assert!(config.has_musicbrainz());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bare_user_agent_rejected() {
        let config = ServiceConfig::new().with_musicbrainz_user_agent("bare-name");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rate_limit_bounds() {
        assert!(ServiceConfig::new()
            .with_rate_limit_delay_ms(0)
            .validate()
            .is_err());
        assert!(ServiceConfig::new()
            .with_rate_limit_delay_ms(120_000)
            .validate()
            .is_err());
        assert!(ServiceConfig::new()
            .with_rate_limit_delay_ms(500)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_empty_base_urls_rejected() {
        assert!(ServiceConfig::new()
            .with_catalog_base_url("")
            .validate()
            .is_err());
        assert!(ServiceConfig::new()
            .with_encyclopedia_base_url("")
            .validate()
            .is_err());
    }
}
