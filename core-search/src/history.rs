//! Recently-played continuation feed
//!
//! Single-category feed over the listening history endpoint. Unlike the
//! search categories it carries a hard item cap; entries are deduplicated
//! by their played-at instant since the same track can repeat.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::catalog::CatalogClient;
use crate::collection::CategoryCollection;
use crate::error::Result;
use crate::models::{CategoryPage, PlayedItem};

/// Total item cap for the feed, matching the dashboard's behavior.
pub const RECENTLY_PLAYED_CAP: usize = 50;

/// Capped, deduplicated feed of the user's recently played tracks.
pub struct RecentlyPlayedFeed {
    catalog: Arc<CatalogClient>,
    cap: usize,
    generation: AtomicU64,
    state: RwLock<CategoryCollection<PlayedItem>>,
}

impl RecentlyPlayedFeed {
    pub fn new(catalog: Arc<CatalogClient>) -> Self {
        Self::with_cap(catalog, RECENTLY_PLAYED_CAP)
    }

    pub fn with_cap(catalog: Arc<CatalogClient>, cap: usize) -> Self {
        Self {
            catalog,
            cap,
            generation: AtomicU64::new(0),
            state: RwLock::new(CategoryCollection::new(Some(cap))),
        }
    }

    /// Clone of the current feed state, for rendering.
    pub async fn snapshot(&self) -> CategoryCollection<PlayedItem> {
        self.state.read().await.clone()
    }

    /// Resets the feed and fetches its first page.
    ///
    /// A refresh supersedes any in-flight fetch; late responses from the
    /// previous generation are dropped rather than applied.
    pub async fn refresh(&self) -> Result<()> {
        // Bump and reset under one lock; see SearchSession::start_search.
        let generation = {
            let mut state = self.state.write().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = CategoryCollection::new(Some(self.cap));
            state.set_loading(true);
            generation
        };

        debug!("Fetching recently played feed");
        let result = self.catalog.recently_played().await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding response for superseded feed refresh");
            return Ok(());
        }

        state.set_loading(false);
        match result {
            Ok(page) => {
                let (items, next) = page.into_parts();
                state.append_page(items, next);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch recently played feed");
                Err(e)
            }
        }
    }

    /// Fetches the next history page.
    ///
    /// Silent no-op once the cap is reached, the cursor is exhausted, or a
    /// fetch is already in flight. Failure leaves the feed and cursor
    /// unchanged so a retry is possible.
    pub async fn load_more(&self) -> Result<()> {
        let (generation, token) = {
            let mut state = self.state.write().await;
            let generation = self.generation.load(Ordering::SeqCst);
            if !state.can_request_more() {
                return Ok(());
            }
            let token = match state.cursor().token() {
                Some(token) => token.to_string(),
                None => return Ok(()),
            };
            state.set_loading(true);
            (generation, token)
        };

        debug!("Fetching next recently played page");
        let result = self
            .catalog
            .continuation::<CategoryPage<PlayedItem>>(&token)
            .await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding continuation for superseded feed");
            return Ok(());
        }

        state.set_loading(false);
        match result {
            Ok(page) => {
                let (items, next) = page.into_parts();
                state.append_page(items, next);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load more history");
                Err(e)
            }
        }
    }
}
