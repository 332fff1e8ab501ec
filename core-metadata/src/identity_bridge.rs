//! Cross-catalog artist identity resolution
//!
//! Links a display name to a primary-catalog artist id through three
//! independently fallible hops:
//!
//! 1. Metadata-service lookup by name, yielding the cross-reference id
//! 2. Cross-reference lookup, yielding a catalog web URL
//! 3. Parsing the id out of the URL's artist path segment
//!
//! The chain resolves to `None` unless every hop succeeds. Most names
//! have no complete mapping, so an absent result is the common outcome,
//! not a failure; transport errors differ from no-match only in how they
//! are logged.

use crate::error::Result;
use crate::providers::lastfm::LastFmClient;
use crate::providers::musicbrainz::MusicBrainzClient;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Path segment preceding the artist id in catalog URLs
const ENTITY_PATH_MARKER: &str = "artist";

/// Three-hop name-to-catalog-id resolver.
pub struct IdentityBridge {
    lastfm: Arc<LastFmClient>,
    musicbrainz: Arc<MusicBrainzClient>,
}

impl IdentityBridge {
    pub fn new(lastfm: Arc<LastFmClient>, musicbrainz: Arc<MusicBrainzClient>) -> Self {
        Self { lastfm, musicbrainz }
    }

    /// Resolves `name` to a primary-catalog artist id, or `None`.
    #[instrument(skip(self))]
    pub async fn link_to_catalog(&self, name: &str) -> Option<String> {
        let info = settle(name, "metadata lookup", self.lastfm.artist_info(name).await)?;

        let mbid = match info.mbid {
            Some(mbid) => mbid,
            None => {
                debug!(name, "Profile carries no cross-reference id");
                return None;
            }
        };

        let url = settle(
            name,
            "cross-reference lookup",
            self.musicbrainz.catalog_artist_url(&mbid).await,
        )?;

        let id = parse_entity_id(&url, ENTITY_PATH_MARKER);
        if id.is_none() {
            debug!(name, url, "Catalog URL carries no parsable artist id");
        }
        id
    }

    /// Resolves `name` to a path an internal artist view can route to.
    pub async fn link_to_catalog_href(&self, name: &str) -> Option<String> {
        self.link_to_catalog(name)
            .await
            .map(|id| format!("/artist/{}", id))
    }
}

/// Collapses one hop's outcome to an option: transport failures log at
/// warn, empty results at debug, and both become `None`.
fn settle<T>(name: &str, hop: &str, outcome: Result<Option<T>>) -> Option<T> {
    match outcome {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!(name, hop, "No match");
            None
        }
        Err(e) => {
            warn!(name, hop, error = %e, "Hop failed");
            None
        }
    }
}

/// Extracts the id segment following `marker` in a URL path, dropping any
/// trailing query string.
fn parse_entity_id(url: &str, marker: &str) -> Option<String> {
    let mut segments = url.split('/').skip_while(|segment| *segment != marker);
    segments.next()?;

    let id = segments.next()?.split('?').next().unwrap_or_default();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_id_strips_query_string() {
        assert_eq!(
            parse_entity_id("https://open.spotify.com/artist/Z9?si=share", "artist"),
            Some("Z9".to_string())
        );
    }

    #[test]
    fn test_parse_entity_id_plain_url() {
        assert_eq!(
            parse_entity_id("https://open.spotify.com/artist/4tZwfgrHOc3mvqYlEYSvVi", "artist"),
            Some("4tZwfgrHOc3mvqYlEYSvVi".to_string())
        );
    }

    #[test]
    fn test_parse_entity_id_missing_marker() {
        assert_eq!(
            parse_entity_id("https://open.spotify.com/album/Z9", "artist"),
            None
        );
    }

    #[test]
    fn test_parse_entity_id_marker_without_segment() {
        assert_eq!(parse_entity_id("https://open.spotify.com/artist", "artist"), None);
        assert_eq!(
            parse_entity_id("https://open.spotify.com/artist/", "artist"),
            None
        );
        assert_eq!(
            parse_entity_id("https://open.spotify.com/artist/?si=x", "artist"),
            None
        );
    }
}
