//! # Artist Enrichment Pipeline
//!
//! Fans an artist's identity out to the metadata, image, and
//! cross-reference services and folds the results into one progressively
//! filling record.
//!
//! ## Resolution tracks
//!
//! ```text
//! enrich(identity)
//!   │  base record available immediately
//!   ├──> profile track    (metadata service: bio, stats, tags, tour flag)
//!   │      └──> related-artists track, once the similar list is known:
//!   │             per artist, image + catalog link resolved together,
//!   │             staggered by list position, merged in completion order
//!   ├──> top-tracks track (metadata service most-played ranking)
//!   └──> image track      (encyclopedia thumbnail with relevance filter)
//! ```
//!
//! Tracks fail independently; a track that finds nothing leaves its
//! fields absent, which is a valid terminal state. Similar artists whose
//! catalog link cannot be resolved are dropped, never emitted half-built.
//! Merges go through `watch::Sender::send_modify`, which serializes them,
//! so concurrent tracks cannot lose each other's updates.

use crate::error::{MetadataError, Result};
use crate::image_resolver::ImageResolver;
use crate::identity_bridge::IdentityBridge;
use crate::providers::lastfm::{ArtistInfo, LastFmClient, SimilarArtist};
use crate::providers::musicbrainz::MusicBrainzClient;
use crate::providers::wikipedia::WikipediaClient;
use crate::record::{
    ArtistIdentity, Biography, EnrichmentRecord, RecordUpdate, RelatedArtistLink, TrackRanking,
};
use bridge_http::HttpClient;
use core_runtime::ServiceConfig;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Concurrent enrichment of artist profiles.
pub struct ArtistEnrichmentPipeline {
    lastfm: Arc<LastFmClient>,
    image_resolver: Arc<ImageResolver>,
    identity_bridge: Arc<IdentityBridge>,
    stagger: Duration,
}

impl ArtistEnrichmentPipeline {
    pub fn new(
        lastfm: Arc<LastFmClient>,
        image_resolver: Arc<ImageResolver>,
        identity_bridge: Arc<IdentityBridge>,
    ) -> Self {
        Self {
            lastfm,
            image_resolver,
            identity_bridge,
            stagger: Duration::from_millis(150),
        }
    }

    /// Wires the full provider stack from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Validation` when the Last.fm API key or the
    /// MusicBrainz user agent is missing.
    pub fn from_config(config: &ServiceConfig, http_client: Arc<dyn HttpClient>) -> Result<Self> {
        let api_key = config.lastfm_api_key.clone().ok_or_else(|| {
            MetadataError::Validation("Last.fm API key is not configured".to_string())
        })?;
        let user_agent = config.musicbrainz_user_agent.clone().ok_or_else(|| {
            MetadataError::Validation("MusicBrainz user agent is not configured".to_string())
        })?;

        let lastfm = Arc::new(LastFmClient::new(
            http_client.clone(),
            api_key,
            config.rate_limit_delay_ms,
        ));
        let musicbrainz = Arc::new(MusicBrainzClient::new(
            http_client.clone(),
            user_agent,
            config.rate_limit_delay_ms,
        ));
        let wikipedia = Arc::new(WikipediaClient::new(
            http_client,
            config.encyclopedia_base_url.clone(),
        ));

        Ok(Self::new(
            lastfm.clone(),
            Arc::new(ImageResolver::new(wikipedia)),
            Arc::new(IdentityBridge::new(lastfm, musicbrainz)),
        )
        .with_stagger(Duration::from_millis(config.related_artist_stagger_ms)))
    }

    /// Sets the per-position delay step for related-artist resolutions.
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Starts enrichment; the receiver observes the record as it fills.
    ///
    /// The base record is in the channel before this returns. Dropping
    /// the receiver ends observation; in-flight lookups finish on their
    /// own and their late merges go nowhere visible.
    pub fn enrich(&self, identity: ArtistIdentity) -> watch::Receiver<EnrichmentRecord> {
        let (tx, rx) = watch::channel(EnrichmentRecord::new(identity.clone()));
        let tx = Arc::new(tx);

        // Image track
        {
            let resolver = self.image_resolver.clone();
            let tx = tx.clone();
            let name = identity.name.clone();
            let fallback = identity.image_url.clone();
            tokio::spawn(async move {
                if let Some(url) = resolver.resolve(&name, fallback.as_deref()).await {
                    tx.send_modify(|record| record.apply(RecordUpdate::ResolvedImage(url)));
                }
            });
        }

        // Top-tracks track
        {
            let lastfm = self.lastfm.clone();
            let tx = tx.clone();
            let name = identity.name.clone();
            tokio::spawn(async move {
                match lastfm.artist_top_tracks(&name).await {
                    Ok(Some(tracks)) if !tracks.is_empty() => {
                        let ranking = tracks
                            .into_iter()
                            .map(|t| TrackRanking {
                                name: t.name,
                                play_count: t.play_count,
                                listeners: t.listeners,
                            })
                            .collect();
                        tx.send_modify(|record| {
                            record.apply(RecordUpdate::TopTracks(ranking))
                        });
                    }
                    Ok(_) => debug!(artist = %name, "No most-played ranking"),
                    Err(e) => warn!(artist = %name, error = %e, "Ranking lookup failed"),
                }
            });
        }

        // Profile track, then the dependent related-artists fan-out
        {
            let lastfm = self.lastfm.clone();
            let resolver = self.image_resolver.clone();
            let bridge = self.identity_bridge.clone();
            let tx = tx.clone();
            let name = identity.name;
            let stagger = self.stagger;
            tokio::spawn(async move {
                let info = match lastfm.artist_info(&name).await {
                    Ok(Some(info)) => info,
                    Ok(None) => {
                        debug!(artist = %name, "No metadata-service profile");
                        return;
                    }
                    Err(e) => {
                        warn!(artist = %name, error = %e, "Profile lookup failed");
                        return;
                    }
                };

                let similar = info.similar.clone();
                tx.send_modify(|record| record.apply(profile_update(info)));

                resolve_related(resolver, bridge, tx, similar, stagger).await;
            });
        }

        rx
    }
}

fn profile_update(info: ArtistInfo) -> RecordUpdate {
    let biography = match (info.bio_summary, info.bio_content) {
        (Some(summary), Some(full_text)) => Some(Biography { summary, full_text }),
        (Some(summary), None) => Some(Biography {
            full_text: summary.clone(),
            summary,
        }),
        (None, Some(full_text)) => Some(Biography {
            summary: full_text.clone(),
            full_text,
        }),
        (None, None) => None,
    };

    RecordUpdate::Profile {
        biography,
        listener_count: info.listeners,
        play_count: info.playcount,
        on_tour: Some(info.on_tour),
        tags: info.tags.into_iter().collect(),
    }
}

/// Resolves every similar artist's image and catalog link concurrently.
///
/// Starts are staggered by list position; completions are merged as they
/// settle, so the record's order is completion order with ties falling
/// back to list order. Artists without a resolvable catalog link are
/// dropped.
async fn resolve_related(
    resolver: Arc<ImageResolver>,
    bridge: Arc<IdentityBridge>,
    tx: Arc<watch::Sender<EnrichmentRecord>>,
    similar: Vec<SimilarArtist>,
    stagger: Duration,
) {
    let mut resolutions: FuturesUnordered<_> = similar
        .into_iter()
        .enumerate()
        .map(|(position, artist)| {
            let resolver = resolver.clone();
            let bridge = bridge.clone();
            async move {
                sleep(stagger * position as u32).await;
                let (image, href) = tokio::join!(
                    resolver.resolve(&artist.name, artist.image.as_deref()),
                    bridge.link_to_catalog_href(&artist.name)
                );
                href.map(|href| RelatedArtistLink {
                    name: artist.name,
                    image,
                    catalog_href: Some(href),
                })
            }
        })
        .collect();

    while let Some(resolved) = resolutions.next().await {
        if let Some(link) = resolved {
            tx.send_modify(|record| record.apply(RecordUpdate::RelatedArtist(link)));
        }
    }
}
