//! Catalog entity models and response envelopes
//!
//! Mirrors the primary catalog's wire format. Item arrays inside page
//! envelopes may contain nulls, which are filtered out on extraction.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// An entity carrying a catalog-issued identity used for deduplication.
pub trait CatalogEntity {
    fn entity_id(&self) -> String;
}

/// Image in one of the catalog's size variants
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// External web links attached to an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalUrls {
    #[serde(rename = "spotify", default)]
    pub catalog: Option<String>,
}

/// Follower statistics
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Followers {
    pub total: u64,
}

/// Minimal artist reference embedded in tracks and albums
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Full artist entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl Artist {
    /// Largest available image, which the catalog lists first
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

/// Album entity, also used as the embedded album reference on tracks
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album_type: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Track entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// Playlist owner reference
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Track count reference on playlists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistTracksRef {
    pub total: u64,
}

/// Playlist entity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// One entry of the listening history feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayedItem {
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

/// The authenticated user's own profile
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl CatalogEntity for Track {
    fn entity_id(&self) -> String {
        self.id.clone()
    }
}

impl CatalogEntity for Artist {
    fn entity_id(&self) -> String {
        self.id.clone()
    }
}

impl CatalogEntity for Album {
    fn entity_id(&self) -> String {
        self.id.clone()
    }
}

impl CatalogEntity for Playlist {
    fn entity_id(&self) -> String {
        self.id.clone()
    }
}

impl CatalogEntity for PlayedItem {
    // The same track can legitimately repeat in the history feed; the
    // played-at instant is the identity of an entry.
    fn entity_id(&self) -> String {
        self.played_at.to_rfc3339()
    }
}

/// One category's page inside a catalog response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> CategoryPage<T> {
    /// Splits the page into its non-null items and continuation token.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.items.into_iter().flatten().collect(), self.next)
    }
}

/// Combined search response carrying a page per category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<CategoryPage<Track>>,
    #[serde(default)]
    pub artists: Option<CategoryPage<Artist>>,
    #[serde(default)]
    pub albums: Option<CategoryPage<Album>>,
    #[serde(default)]
    pub playlists: Option<CategoryPage<Playlist>>,
}
