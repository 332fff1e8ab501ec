//! Last.fm artist profile client
//!
//! Two methods of the one REST endpoint are consumed:
//! `artist.getinfo` for the profile (biography, statistics, tags, tour
//! flag, similar artists) and `artist.gettoptracks` for the most-played
//! ranking, both keyed by display name:
//! `https://ws.audioscrobbler.com/2.0/?method={method}&artist={artist}&api_key={key}&format=json`
//!
//! Every request carries the API key (issued per application by Last.fm)
//! and respects the configured inter-request delay, which matters when
//! the enrichment pipeline fans out over a similar-artists list.
//!
//! ## Response Quirks
//!
//! Listener and play counts arrive as JSON strings and are parsed
//! leniently; a malformed count degrades to an absent statistic rather
//! than a failed lookup. An unknown artist is signaled through the API's
//! error code 6 and maps to `Ok(None)`.

use crate::error::{MetadataError, Result};
use crate::providers::RateLimiter;
use bridge_http::{HttpClient, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Last.fm API base URL
const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Last.fm error code for an unknown artist
const ERROR_ARTIST_NOT_FOUND: i32 = 6;

/// Entries requested from the most-played ranking
const TOP_TRACKS_LIMIT: u32 = 10;

/// Artist profile as returned by `artist.getInfo`
#[derive(Debug, Clone)]
pub struct ArtistInfo {
    /// Cross-reference identifier, when Last.fm knows one
    pub mbid: Option<String>,
    pub bio_summary: Option<String>,
    pub bio_content: Option<String>,
    pub listeners: Option<u64>,
    pub playcount: Option<u64>,
    pub on_tour: bool,
    pub tags: Vec<String>,
    pub similar: Vec<SimilarArtist>,
}

/// Entry of the similar-artists list, with the service's own low-res image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarArtist {
    pub name: String,
    pub image: Option<String>,
}

/// One entry of the artist's most-played ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTrack {
    pub name: String,
    pub play_count: Option<u64>,
    pub listeners: Option<u64>,
}

/// Last.fm API client
pub struct LastFmClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

#[derive(Debug, Deserialize)]
struct ArtistInfoResponse {
    artist: Option<ArtistPayload>,
}

#[derive(Debug, Deserialize)]
struct ArtistPayload {
    #[serde(default)]
    mbid: Option<String>,
    #[serde(default)]
    stats: Option<StatsPayload>,
    #[serde(default)]
    ontour: Option<String>,
    #[serde(default)]
    bio: Option<BioPayload>,
    #[serde(default)]
    tags: Option<TagsPayload>,
    #[serde(default)]
    similar: Option<SimilarPayload>,
}

#[derive(Debug, Deserialize)]
struct StatsPayload {
    #[serde(default)]
    listeners: Option<String>,
    #[serde(default)]
    playcount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BioPayload {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsPayload {
    #[serde(default)]
    tag: Vec<TagPayload>,
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SimilarPayload {
    #[serde(default)]
    artist: Vec<SimilarArtistPayload>,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistPayload {
    name: String,
    #[serde(default)]
    image: Vec<ImagePayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImagePayload {
    #[serde(rename = "#text")]
    url: String,
    size: String,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    toptracks: Option<TopTracksPayload>,
}

#[derive(Debug, Deserialize)]
struct TopTracksPayload {
    #[serde(default)]
    track: Vec<TopTrackPayload>,
}

#[derive(Debug, Deserialize)]
struct TopTrackPayload {
    name: String,
    #[serde(default)]
    playcount: Option<String>,
    #[serde(default)]
    listeners: Option<String>,
}

/// Last.fm error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: i32,
    message: String,
}

impl LastFmClient {
    /// Creates a client that signs requests with `api_key` and spaces
    /// them at least `rate_limit_delay_ms` apart.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_key: String,
        rate_limit_delay_ms: u64,
    ) -> Self {
        Self {
            http_client,
            api_key,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(rate_limit_delay_ms))),
        }
    }

    /// Fetches an artist profile by display name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ArtistInfo))` - Profile found
    /// - `Ok(None)` - Last.fm has no entry for this name
    /// - `Err` - API error or network failure
    pub async fn artist_info(&self, artist: &str) -> Result<Option<ArtistInfo>> {
        let Some(response) = self.call_api("artist.getinfo", artist, None).await? else {
            return Ok(None);
        };

        let info_response: ArtistInfoResponse = serde_json::from_slice(&response.body)
            .map_err(|e| {
                MetadataError::JsonParse(format!("Failed to parse Last.fm response: {}", e))
            })?;

        let Some(payload) = info_response.artist else {
            debug!("Last.fm response carried no artist payload for '{}'", artist);
            return Ok(None);
        };

        let info = convert_payload(payload);
        info!(
            artist,
            similar = info.similar.len(),
            has_bio = info.bio_summary.is_some(),
            "Fetched Last.fm artist profile"
        );

        Ok(Some(info))
    }

    /// Fetches the artist's most played tracks, ranked.
    ///
    /// Same absence semantics as [`artist_info`](Self::artist_info): an
    /// unknown artist or a response without a ranking is `Ok(None)`.
    pub async fn artist_top_tracks(&self, artist: &str) -> Result<Option<Vec<TopTrack>>> {
        let Some(response) = self
            .call_api("artist.gettoptracks", artist, Some(TOP_TRACKS_LIMIT))
            .await?
        else {
            return Ok(None);
        };

        let top_response: TopTracksResponse = serde_json::from_slice(&response.body)
            .map_err(|e| {
                MetadataError::JsonParse(format!("Failed to parse Last.fm response: {}", e))
            })?;

        let Some(payload) = top_response.toptracks else {
            debug!("Last.fm response carried no ranking for '{}'", artist);
            return Ok(None);
        };

        let tracks: Vec<TopTrack> = payload
            .track
            .into_iter()
            .map(|t| TopTrack {
                name: t.name,
                play_count: parse_count(t.playcount),
                listeners: parse_count(t.listeners),
            })
            .collect();

        debug!("Fetched {} ranked tracks for '{}'", tracks.len(), artist);
        Ok(Some(tracks))
    }

    /// Issues one API call and handles the failure modes shared by every
    /// method: transport errors, throttling, and the error-in-200-body
    /// convention. `Ok(None)` is the unknown-artist case.
    async fn call_api(
        &self,
        method: &str,
        artist: &str,
        limit: Option<u32>,
    ) -> Result<Option<HttpResponse>> {
        let mut url = format!(
            "{}?method={}&artist={}&api_key={}&format=json",
            LASTFM_API_BASE,
            method,
            urlencoding::encode(artist),
            urlencoding::encode(&self.api_key)
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={}", limit));
        }

        debug!("Querying Last.fm: {} for '{}'", method, artist);

        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::Network(format!("Last.fm request failed: {}", e)))?;

        if !response.is_success() {
            if response.status == 429 {
                return Err(MetadataError::RateLimited {
                    provider: "Last.fm".to_string(),
                    retry_after_seconds: response.retry_after_seconds(60),
                });
            }

            return Err(MetadataError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        // The API reports errors in a 200 body
        if let Ok(error_resp) = serde_json::from_slice::<ErrorResponse>(&response.body) {
            if error_resp.error == ERROR_ARTIST_NOT_FOUND {
                debug!("Artist not found on Last.fm: '{}'", artist);
                return Ok(None);
            }
            return Err(MetadataError::RemoteApi(format!(
                "Last.fm API error {}: {}",
                error_resp.error, error_resp.message
            )));
        }

        Ok(Some(response))
    }
}

fn convert_payload(payload: ArtistPayload) -> ArtistInfo {
    let stats = payload.stats.unwrap_or(StatsPayload {
        listeners: None,
        playcount: None,
    });

    let (bio_summary, bio_content) = match payload.bio {
        Some(bio) => (clean_text(bio.summary), clean_text(bio.content)),
        None => (None, None),
    };

    ArtistInfo {
        mbid: payload.mbid.filter(|m| !m.is_empty()),
        bio_summary,
        bio_content,
        listeners: parse_count(stats.listeners),
        playcount: parse_count(stats.playcount),
        on_tour: payload.ontour.as_deref() == Some("1"),
        tags: payload
            .tags
            .map(|tags| tags.tag.into_iter().map(|t| t.name).collect())
            .unwrap_or_default(),
        similar: payload
            .similar
            .map(|similar| {
                similar
                    .artist
                    .into_iter()
                    .map(|a| SimilarArtist {
                        image: pick_image(&a.image),
                        name: a.name,
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Counts arrive as strings; anything unparsable becomes an absent stat.
fn parse_count(raw: Option<String>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse().ok())
}

fn clean_text(raw: Option<String>) -> Option<String> {
    raw.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Largest usable image variant.
/// Prefer sizes in order: extralarge > large > medium, then anything.
fn pick_image(images: &[ImagePayload]) -> Option<String> {
    images
        .iter()
        .find(|img| img.size == "extralarge")
        .or_else(|| images.iter().find(|img| img.size == "large"))
        .or_else(|| images.iter().find(|img| img.size == "medium"))
        .or_else(|| images.first())
        .map(|img| img.url.clone())
        .filter(|url| !url.is_empty())
}
