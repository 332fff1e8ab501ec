//! # Search Session
//!
//! Owns the four independently paginated result collections behind a search
//! view and orchestrates the initial fan-out plus per-category load-more.
//!
//! ## Lifecycle
//!
//! A session is rebuilt from scratch whenever the query changes:
//! `start_search` discards all four collections, bumps the session
//! generation, and issues one combined request that seeds every category
//! with its first page and continuation cursor. In-flight responses from a
//! superseded generation are discarded at apply time; the transport has no
//! cancellation primitive, so the guard is the generation comparison, not
//! an abort.
//!
//! ## Load-more discipline
//!
//! Each category gates its own continuation fetch with the collection's
//! `loading` flag, so repeated triggers while a page is in flight are
//! silent no-ops, and categories never block one another. A failed fetch
//! leaves the collection and its cursor untouched and clears the flag, so
//! the caller can retry with the last-known-good cursor.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::catalog::CatalogClient;
use crate::collection::CategoryCollection;
use crate::error::{Result, SearchError};
use crate::models::{Album, Artist, CatalogEntity, CategoryPage, Playlist, SearchResponse, Track};

/// One of the four independently paginated result categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchCategory {
    Tracks,
    Artists,
    Albums,
    Playlists,
}

impl SearchCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::Tracks => "tracks",
            SearchCategory::Artists => "artists",
            SearchCategory::Albums => "albums",
            SearchCategory::Playlists => "playlists",
        }
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session tuning knobs.
///
/// The search categories and the recently-played feed are capped
/// independently; see [`crate::history::RECENTLY_PLAYED_CAP`] for the
/// feed's counterpart.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Cap applied to every search category. `None` leaves growth bounded
    /// only by cursor exhaustion.
    pub category_cap: Option<usize>,
}

/// Observable session state: the query plus the four collections.
#[derive(Debug, Clone)]
pub struct SessionState {
    query: String,
    session_loading: bool,
    tracks: CategoryCollection<Track>,
    artists: CategoryCollection<Artist>,
    albums: CategoryCollection<Album>,
    playlists: CategoryCollection<Playlist>,
}

impl SessionState {
    fn empty(config: &SessionConfig) -> Self {
        Self {
            query: String::new(),
            session_loading: false,
            tracks: CategoryCollection::new(config.category_cap),
            artists: CategoryCollection::new(config.category_cap),
            albums: CategoryCollection::new(config.category_cap),
            playlists: CategoryCollection::new(config.category_cap),
        }
    }

    fn for_query(query: &str, config: &SessionConfig) -> Self {
        let mut state = Self::empty(config);
        state.query = query.to_string();
        state.session_loading = true;
        state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// True while the initial fan-out is unresolved.
    pub fn is_session_loading(&self) -> bool {
        self.session_loading
    }

    pub fn tracks(&self) -> &CategoryCollection<Track> {
        &self.tracks
    }

    pub fn artists(&self) -> &CategoryCollection<Artist> {
        &self.artists
    }

    pub fn albums(&self) -> &CategoryCollection<Album> {
        &self.albums
    }

    pub fn playlists(&self) -> &CategoryCollection<Playlist> {
        &self.playlists
    }

    /// Whether the named category may currently grow.
    pub fn can_load_more(&self, category: SearchCategory) -> bool {
        match category {
            SearchCategory::Tracks => self.tracks.can_request_more(),
            SearchCategory::Artists => self.artists.can_request_more(),
            SearchCategory::Albums => self.albums.can_request_more(),
            SearchCategory::Playlists => self.playlists.can_request_more(),
        }
    }
}

/// Four-category search session with independent load-more.
pub struct SearchSession {
    catalog: Arc<CatalogClient>,
    config: SessionConfig,
    generation: AtomicU64,
    state: RwLock<SessionState>,
}

impl SearchSession {
    pub fn new(catalog: Arc<CatalogClient>) -> Self {
        Self::with_config(catalog, SessionConfig::default())
    }

    pub fn with_config(catalog: Arc<CatalogClient>, config: SessionConfig) -> Self {
        let state = RwLock::new(SessionState::empty(&config));
        Self {
            catalog,
            config,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Clone of the current observable state, for rendering.
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Starts a fresh session for `query`.
    ///
    /// Discards all previous collections, then issues the combined search
    /// whose response seeds each category with its first page and cursor.
    /// If another `start_search` supersedes this one before the response
    /// arrives, the late response is dropped and `Ok(())` is returned.
    #[instrument(skip(self))]
    pub async fn start_search(&self, query: &str) -> Result<()> {
        // Bump and reset under one lock so a racing start_search cannot
        // interleave between them and resurrect a superseded session.
        let generation = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SessionState::for_query(query, &self.config);
            generation
        };

        debug!(query, "Issuing combined search fan-out");
        let result = self.catalog.search(query).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(query, "Discarding response for superseded session");
            return Ok(());
        }

        state.session_loading = false;
        match result {
            Ok(response) => {
                apply_page(&mut state.tracks, response.tracks);
                apply_page(&mut state.artists, response.artists);
                apply_page(&mut state.albums, response.albums);
                apply_page(&mut state.playlists, response.playlists);
                Ok(())
            }
            Err(e) => {
                warn!(query, error = %e, "Combined search failed");
                Err(e)
            }
        }
    }

    /// Fetches the next page for one category.
    ///
    /// Silent no-op when the category has nothing further to load: cursor
    /// exhausted, a page already in flight, or the cap reached. On failure
    /// the collection and cursor are left unchanged and the error is
    /// surfaced scoped to this category only.
    pub async fn load_more(&self, category: SearchCategory) -> Result<()> {
        match category {
            SearchCategory::Tracks => {
                self.load_more_slot(category, tracks_slot, tracks_page).await
            }
            SearchCategory::Artists => {
                self.load_more_slot(category, artists_slot, artists_page).await
            }
            SearchCategory::Albums => {
                self.load_more_slot(category, albums_slot, albums_page).await
            }
            SearchCategory::Playlists => {
                self.load_more_slot(category, playlists_slot, playlists_page)
                    .await
            }
        }
    }

    async fn load_more_slot<T>(
        &self,
        category: SearchCategory,
        slot: fn(&mut SessionState) -> &mut CategoryCollection<T>,
        pick: fn(SearchResponse) -> Option<CategoryPage<T>>,
    ) -> Result<()>
    where
        T: CatalogEntity + Clone,
    {
        // Generation is read under the same lock start_search swaps state
        // under, so it always matches the collection marked loading here.
        let (generation, token) = {
            let mut state = self.state.write().await;
            let generation = self.generation.load(Ordering::SeqCst);
            let collection = slot(&mut state);
            if !collection.can_request_more() {
                return Ok(());
            }
            let token = match collection.cursor().token() {
                Some(token) => token.to_string(),
                None => return Ok(()),
            };
            collection.set_loading(true);
            (generation, token)
        };

        debug!(category = %category, "Fetching continuation page");
        let result = self.catalog.continuation::<SearchResponse>(&token).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(category = %category, "Discarding continuation for superseded session");
            return Ok(());
        }

        let collection = slot(&mut state);
        collection.set_loading(false);
        match result {
            Ok(response) => match pick(response) {
                Some(page) => {
                    let (items, next) = page.into_parts();
                    collection.append_page(items, next);
                    Ok(())
                }
                None => {
                    warn!(category = %category, "Continuation response missing category page");
                    Err(SearchError::MissingCategory { category })
                }
            },
            Err(e) => {
                warn!(category = %category, error = %e, "Failed to load more results");
                Err(e)
            }
        }
    }
}

fn apply_page<T: CatalogEntity>(
    collection: &mut CategoryCollection<T>,
    page: Option<CategoryPage<T>>,
) {
    if let Some(page) = page {
        let (items, next) = page.into_parts();
        collection.append_page(items, next);
    }
}

// Category projections passed into the generic load-more path.

fn tracks_slot(state: &mut SessionState) -> &mut CategoryCollection<Track> {
    &mut state.tracks
}

fn artists_slot(state: &mut SessionState) -> &mut CategoryCollection<Artist> {
    &mut state.artists
}

fn albums_slot(state: &mut SessionState) -> &mut CategoryCollection<Album> {
    &mut state.albums
}

fn playlists_slot(state: &mut SessionState) -> &mut CategoryCollection<Playlist> {
    &mut state.playlists
}

fn tracks_page(response: SearchResponse) -> Option<CategoryPage<Track>> {
    response.tracks
}

fn artists_page(response: SearchResponse) -> Option<CategoryPage<Artist>> {
    response.artists
}

fn albums_page(response: SearchResponse) -> Option<CategoryPage<Album>> {
    response.albums
}

fn playlists_page(response: SearchResponse) -> Option<CategoryPage<Playlist>> {
    response.playlists
}
