//! Primary catalog API connector
//!
//! Authenticated REST client for the music catalog backing search, the
//! listening dashboard, and artist profiles.
//!
//! ## Endpoints
//!
//! - **Combined search**: `GET {base}/search?q={query}&type=track,artist,album,playlist`
//! - **Continuation**: `GET {token}` (the envelope's `next` URL, verbatim)
//! - **Artist lookup**: `GET {base}/artists/{id}`
//! - **Artist albums**: `GET {base}/artists/{id}/albums`
//! - **Top tracks/artists**: `GET {base}/me/top/{tracks|artists}?time_range={range}`
//! - **Recently played**: `GET {base}/me/player/recently-played`
//! - **Playlists**: `GET {base}/me/playlists`
//! - **Profile**: `GET {base}/me`

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use bridge_http::{HttpClient, HttpRequest};

use crate::error::{Result, SearchError};
use crate::models::{
    Album, Artist, CategoryPage, PlayedItem, Playlist, SearchResponse, Track, UserProfile,
};

/// Entity types requested by the combined search
const SEARCH_TYPES: &str = "track,artist,album,playlist";

/// Page size for initial pages; continuation URLs carry their own
const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Timeout for catalog requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Time window for the top-tracks and top-artists rankings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    /// Roughly the last four weeks
    ShortTerm,
    /// Roughly the last six months
    #[default]
    MediumTerm,
    /// Full listening history
    LongTerm,
}

impl TimeRange {
    pub fn as_param(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

/// Primary catalog API client
///
/// Holds the bearer credential and attaches it to every request; token
/// acquisition and refresh happen elsewhere.
pub struct CatalogClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    access_token: String,
}

impl CatalogClient {
    /// Creates a new catalog client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `base_url` - Catalog API base URL, no trailing slash
    /// * `access_token` - Bearer token with the user-library scopes
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "Querying catalog");

        let request = HttpRequest::get(url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(SearchError::Api {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| SearchError::Parse(format!("Failed to parse catalog response: {}", e)))
    }

    /// Combined search returning an initial page for all four categories.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let url = format!(
            "{}/search?q={}&type={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            SEARCH_TYPES,
            DEFAULT_PAGE_LIMIT
        );
        self.get_json(url).await
    }

    /// Fetches the next page behind a continuation token.
    ///
    /// The token is the URL issued by a previous response envelope and is
    /// used verbatim; its shape is the catalog's business.
    pub async fn continuation<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        self.get_json(token.to_string()).await
    }

    /// Single artist lookup by catalog id.
    #[instrument(skip(self))]
    pub async fn artist(&self, artist_id: &str) -> Result<Artist> {
        let url = format!("{}/artists/{}", self.base_url, artist_id);
        self.get_json(url).await
    }

    /// An artist's album catalog, first page.
    pub async fn artist_albums(&self, artist_id: &str) -> Result<CategoryPage<Album>> {
        let url = format!(
            "{}/artists/{}/albums?limit={}",
            self.base_url, artist_id, DEFAULT_PAGE_LIMIT
        );
        self.get_json(url).await
    }

    /// The user's most played tracks over a time window.
    pub async fn top_tracks(&self, range: TimeRange) -> Result<CategoryPage<Track>> {
        let url = format!(
            "{}/me/top/tracks?time_range={}&limit={}",
            self.base_url,
            range.as_param(),
            DEFAULT_PAGE_LIMIT
        );
        self.get_json(url).await
    }

    /// The user's most played artists over a time window.
    pub async fn top_artists(&self, range: TimeRange) -> Result<CategoryPage<Artist>> {
        let url = format!(
            "{}/me/top/artists?time_range={}&limit={}",
            self.base_url,
            range.as_param(),
            DEFAULT_PAGE_LIMIT
        );
        self.get_json(url).await
    }

    /// First page of the user's listening history feed.
    pub async fn recently_played(&self) -> Result<CategoryPage<PlayedItem>> {
        let url = format!(
            "{}/me/player/recently-played?limit={}",
            self.base_url, DEFAULT_PAGE_LIMIT
        );
        self.get_json(url).await
    }

    /// The user's playlists.
    pub async fn my_playlists(&self) -> Result<CategoryPage<Playlist>> {
        let url = format!("{}/me/playlists", self.base_url);
        self.get_json(url).await
    }

    /// The authenticated user's own profile.
    pub async fn me(&self) -> Result<UserProfile> {
        let url = format!("{}/me", self.base_url);
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_http::{HttpResponse, TransportError};
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_http::Result<HttpResponse>;
        }
    }

    fn json_response(body: &str) -> bridge_http::Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.as_bytes().to_vec()),
        })
    }

    #[tokio::test]
    async fn test_search_builds_combined_query() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("/search?q=daft%20punk"));
            assert!(req.url.contains("type=track,artist,album,playlist"));
            assert!(req.headers.contains_key("Authorization"));

            json_response(
                r#"{
                    "tracks": {"items": [{"id": "t1", "name": "One More Time"}], "next": "https://catalog.example/search?offset=20"},
                    "artists": {"items": [], "next": null}
                }"#,
            )
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let response = client.search("daft punk").await.unwrap();

        let (tracks, next) = response.tracks.unwrap().into_parts();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "t1");
        assert_eq!(
            next,
            Some("https://catalog.example/search?offset=20".to_string())
        );
    }

    #[tokio::test]
    async fn test_continuation_uses_token_verbatim() {
        let mut mock_http = MockHttpClient::new();
        let token = "https://catalog.example/search?offset=20&weird=%7Btoken%7D";

        mock_http.expect_execute().times(1).returning(move |req| {
            assert_eq!(
                req.url,
                "https://catalog.example/search?offset=20&weird=%7Btoken%7D"
            );
            json_response(r#"{"tracks": {"items": [], "next": null}}"#)
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let response: SearchResponse = client.continuation(token).await.unwrap();
        assert!(response.tracks.unwrap().next.is_none());
    }

    #[tokio::test]
    async fn test_artist_lookup() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/artists/a1"));
            json_response(
                r#"{"id": "a1", "name": "Daft Punk", "genres": ["french house"],
                    "images": [{"url": "https://img.example/dp"}]}"#,
            )
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let artist = client.artist("a1").await.unwrap();

        assert_eq!(artist.name, "Daft Punk");
        assert_eq!(artist.genres, vec!["french house"]);
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 401,
                headers: HashMap::new(),
                body: Bytes::from_static(b"expired token"),
            })
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let result = client.artist("a1").await;

        match result {
            Err(SearchError::Api { status, .. }) => assert_eq!(status, 401),
            other => panic!("expected Api error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Err(TransportError::Timeout("catalog".to_string())));

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let result = client.recently_played().await;

        assert!(matches!(result, Err(SearchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_top_tracks_carries_time_range() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("/me/top/tracks?time_range=long_term"));
            json_response(r#"{"items": [{"id": "t1", "name": "Around the World"}], "next": null}"#)
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let (tracks, next) = client
            .top_tracks(TimeRange::LongTerm)
            .await
            .unwrap()
            .into_parts();

        assert_eq!(tracks.len(), 1);
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_artist_albums_pages_by_artist() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.contains("/artists/a1/albums?limit="));
            json_response(
                r#"{"items": [{"id": "al1", "name": "Discovery", "album_type": "album"}],
                    "next": "https://catalog.example/v1/artists/a1/albums?offset=20"}"#,
            )
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let (albums, next) = client.artist_albums("a1").await.unwrap().into_parts();

        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].album_type.as_deref(), Some("album"));
        assert!(next.is_some());
    }

    #[tokio::test]
    async fn test_me_returns_profile() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/me"));
            json_response(r#"{"id": "u1", "display_name": "Ada", "followers": {"total": 7}}"#)
        });

        let client = CatalogClient::new(
            Arc::new(mock_http),
            "https://catalog.example/v1",
            "test_token",
        );
        let profile = client.me().await.unwrap();

        assert_eq!(profile.id, "u1");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.followers.map(|f| f.total), Some(7));
    }

    #[test]
    fn test_time_range_params() {
        assert_eq!(TimeRange::ShortTerm.as_param(), "short_term");
        assert_eq!(TimeRange::MediumTerm.as_param(), "medium_term");
        assert_eq!(TimeRange::LongTerm.as_param(), "long_term");
        assert_eq!(TimeRange::default(), TimeRange::MediumTerm);
    }
}
