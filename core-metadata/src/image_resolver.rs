//! Artist image resolution via encyclopedia summaries
//!
//! An encyclopedia thumbnail is accepted only when the page extract reads
//! as music-related, so a namesake page (a city, a concept, a film) never
//! supplies an artist's picture. Anything else, including transport
//! failures, resolves to the caller-supplied fallback image.
//!
//! Lookups are idempotent and cached by name. The cache is shared
//! read-only across concurrent resolutions and never invalidated within a
//! session; staleness inside one session is acceptable.

use crate::providers::wikipedia::WikipediaClient;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Vocabulary signaling that an extract describes a music act
const MUSIC_KEYWORDS: &[&str] = &[
    "musician",
    "band",
    "singer",
    "songwriter",
    "rapper",
    "composer",
    "record producer",
    "music",
    "song",
    "album",
    "guitarist",
    "vocalist",
    "drummer",
];

/// Cached name-to-thumbnail decisions kept per resolver
const IMAGE_CACHE_CAPACITY: usize = 256;

/// Resolves display images by name with a music-relevance filter.
pub struct ImageResolver {
    wikipedia: Arc<WikipediaClient>,
    cache: Mutex<LruCache<String, Option<String>>>,
}

impl ImageResolver {
    pub fn new(wikipedia: Arc<WikipediaClient>) -> Self {
        Self {
            wikipedia,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(IMAGE_CACHE_CAPACITY).expect("capacity is non-zero"),
            )),
        }
    }

    /// Resolves a display image for `name`.
    ///
    /// Returns the encyclopedia thumbnail when the page summary is
    /// music-relevant and carries one; the fallback otherwise. The cache
    /// stores the encyclopedia decision only, so the same name can pair
    /// with different fallbacks at different call sites.
    pub async fn resolve(&self, name: &str, fallback: Option<&str>) -> Option<String> {
        let cached = self.cache.lock().await.get(name).cloned();
        let resolved = match cached {
            Some(decision) => decision,
            None => {
                let decision = self.lookup(name).await;
                self.cache
                    .lock()
                    .await
                    .put(name.to_string(), decision.clone());
                decision
            }
        };

        resolved.or_else(|| fallback.map(str::to_owned))
    }

    async fn lookup(&self, name: &str) -> Option<String> {
        let summary = match self.wikipedia.page_summary(name).await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                debug!(name, "No encyclopedia page");
                return None;
            }
            Err(e) => {
                warn!(name, error = %e, "Encyclopedia lookup failed");
                return None;
            }
        };

        let Some(extract) = summary.extract else {
            debug!(name, "Encyclopedia page has no extract");
            return None;
        };

        if !is_music_related(&extract) {
            debug!(name, "Encyclopedia page is not music-related");
            return None;
        }

        summary.thumbnail
    }
}

/// Case-insensitive keyword match against the music vocabulary.
fn is_music_related(extract: &str) -> bool {
    let lowered = extract.to_lowercase();
    MUSIC_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}
