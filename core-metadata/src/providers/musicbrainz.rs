//! MusicBrainz URL-relation client
//!
//! Maps a cross-reference identifier to the artist's page in the primary
//! catalog through MusicBrainz URL relations. This indirection exists
//! because the metadata service knows cross-reference ids but nothing
//! about the catalog's own id namespace.
//!
//! One endpoint is consumed:
//! artist lookup: `https://musicbrainz.org/ws/2/artist/{mbid}?inc=url-rels&fmt=json`
//!
//! MusicBrainz asks clients for roughly one request per second and an
//! identifying user agent of the form `AppName/Version (Contact)`; both
//! are enforced here through the configured delay and the mandatory
//! user-agent constructor argument.

use crate::error::{MetadataError, Result};
use crate::providers::RateLimiter;
use bridge_http::{HttpClient, HttpRequest};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// MusicBrainz API base URL
const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";

/// Substring identifying the primary catalog's artist namespace in a
/// URL relation target
const CATALOG_URL_MARKER: &str = "open.spotify.com/artist/";

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: Arc<dyn HttpClient>,
    user_agent: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

#[derive(Debug, Deserialize)]
struct ArtistLookupResponse {
    #[serde(default)]
    relations: Vec<UrlRelation>,
}

#[derive(Debug, Deserialize)]
struct UrlRelation {
    #[serde(rename = "type", default)]
    relation_type: Option<String>,
    #[serde(default)]
    url: Option<RelationTarget>,
}

#[derive(Debug, Deserialize)]
struct RelationTarget {
    resource: String,
}

impl MusicBrainzClient {
    /// Creates a client identifying itself as `user_agent` and spacing
    /// requests at least `rate_limit_delay_ms` apart.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        user_agent: String,
        rate_limit_delay_ms: u64,
    ) -> Self {
        Self {
            http_client,
            user_agent,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(rate_limit_delay_ms))),
        }
    }

    /// Resolves a cross-reference id to the artist's primary-catalog URL
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))` - Catalog URL from the artist's URL relations
    /// - `Ok(None)` - No catalog relation recorded (the common case), the
    ///   id is unknown, or the service is temporarily unavailable
    /// - `Err` - API error or network failure
    pub async fn catalog_artist_url(&self, mbid: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/artist/{}?inc=url-rels&fmt=json",
            MUSICBRAINZ_API_BASE,
            urlencoding::encode(mbid)
        );

        debug!("Looking up MusicBrainz URL relations: {}", url);

        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self.http_client.execute(request).await.map_err(|e| {
            MetadataError::Network(format!("MusicBrainz lookup failed: {}", e))
        })?;

        match response.status {
            200 => {}
            404 => {
                debug!("Unknown MusicBrainz artist id: {}", mbid);
                return Ok(None);
            }
            503 => {
                warn!("MusicBrainz service unavailable (503)");
                return Ok(None);
            }
            429 => {
                return Err(MetadataError::RateLimited {
                    provider: "MusicBrainz".to_string(),
                    retry_after_seconds: response.retry_after_seconds(60),
                });
            }
            status => {
                return Err(MetadataError::Http {
                    status,
                    body: String::from_utf8_lossy(&response.body).to_string(),
                });
            }
        }

        let lookup: ArtistLookupResponse = serde_json::from_slice(&response.body)
            .map_err(|e| {
                MetadataError::JsonParse(format!("Failed to parse MusicBrainz response: {}", e))
            })?;

        Ok(select_catalog_url(&lookup.relations))
    }
}

/// Picks the relation pointing into the catalog's artist namespace,
/// preferring explicit streaming relations.
fn select_catalog_url(relations: &[UrlRelation]) -> Option<String> {
    let catalog_relations = || {
        relations.iter().filter(|rel| {
            rel.url
                .as_ref()
                .is_some_and(|target| target.resource.contains(CATALOG_URL_MARKER))
        })
    };

    catalog_relations()
        .find(|rel| {
            matches!(
                rel.relation_type.as_deref(),
                Some("streaming") | Some("free streaming")
            )
        })
        .or_else(|| catalog_relations().next())
        .and_then(|rel| rel.url.as_ref())
        .map(|target| target.resource.clone())
}
