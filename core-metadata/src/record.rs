//! Progressive artist profile record
//!
//! The record starts as the bare catalog identity and grows one field at
//! a time as resolution tracks complete. Merges are pure and monotonic: a
//! populated field is never cleared, so a reader at any instant sees a
//! growing set of fields. An absent field after resolution has settled is
//! a valid terminal state.

use core_search::models::Artist;
use std::collections::BTreeSet;

/// Artist identity as issued by the primary catalog. Immutable once
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistIdentity {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub genres: BTreeSet<String>,
}

impl ArtistIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: None,
            genres: BTreeSet::new(),
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

impl From<&Artist> for ArtistIdentity {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id.clone(),
            name: artist.name.clone(),
            image_url: artist.primary_image().map(str::to_owned),
            genres: artist.genres.iter().cloned().collect(),
        }
    }
}

/// Biography text from the metadata service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Biography {
    pub summary: String,
    pub full_text: String,
}

/// One entry of the metadata service's most-played ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRanking {
    pub name: String,
    pub play_count: Option<u64>,
    pub listeners: Option<u64>,
}

/// Cross-referenced similar artist
///
/// `catalog_href` is populated only when the full identity resolution
/// succeeded; the pipeline drops unlinkable artists before they reach the
/// record, so emitted links always carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedArtistLink {
    pub name: String,
    pub image: Option<String>,
    pub catalog_href: Option<String>,
}

/// Accumulated view state for one artist profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub identity: ArtistIdentity,
    pub biography: Option<Biography>,
    pub listener_count: Option<u64>,
    pub play_count: Option<u64>,
    pub on_tour: Option<bool>,
    pub tags: BTreeSet<String>,
    pub resolved_image: Option<String>,
    /// Most-played tracks in rank order, when the service has a ranking.
    pub top_tracks: Vec<TrackRanking>,
    pub related_artists: Vec<RelatedArtistLink>,
    revision: u64,
}

/// One resolution track's contribution to the record.
#[derive(Debug, Clone)]
pub enum RecordUpdate {
    /// Metadata-service profile: biography, statistics, tags, tour flag
    Profile {
        biography: Option<Biography>,
        listener_count: Option<u64>,
        play_count: Option<u64>,
        on_tour: Option<bool>,
        tags: BTreeSet<String>,
    },
    /// Display image from the image resolution track
    ResolvedImage(String),
    /// Most-played ranking, delivered whole and in rank order
    TopTracks(Vec<TrackRanking>),
    /// One fully resolved similar artist, appended in completion order
    RelatedArtist(RelatedArtistLink),
}

impl EnrichmentRecord {
    /// Base record carrying only the catalog identity.
    pub fn new(identity: ArtistIdentity) -> Self {
        Self {
            identity,
            biography: None,
            listener_count: None,
            play_count: None,
            on_tour: None,
            tags: BTreeSet::new(),
            resolved_image: None,
            top_tracks: Vec::new(),
            related_artists: Vec::new(),
            revision: 0,
        }
    }

    /// Number of merges applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies one update in place. Present fields are never overwritten
    /// or cleared; tags and related artists only accumulate.
    pub fn apply(&mut self, update: RecordUpdate) {
        match update {
            RecordUpdate::Profile {
                biography,
                listener_count,
                play_count,
                on_tour,
                tags,
            } => {
                if self.biography.is_none() {
                    self.biography = biography;
                }
                if self.listener_count.is_none() {
                    self.listener_count = listener_count;
                }
                if self.play_count.is_none() {
                    self.play_count = play_count;
                }
                if self.on_tour.is_none() {
                    self.on_tour = on_tour;
                }
                self.tags.extend(tags);
            }
            RecordUpdate::ResolvedImage(url) => {
                if self.resolved_image.is_none() {
                    self.resolved_image = Some(url);
                }
            }
            RecordUpdate::TopTracks(ranking) => {
                if self.top_tracks.is_empty() {
                    self.top_tracks = ranking;
                }
            }
            RecordUpdate::RelatedArtist(link) => {
                self.related_artists.push(link);
            }
        }
        self.revision += 1;
    }

    /// Pure merge: consumes the record and returns its successor.
    pub fn merged(mut self, update: RecordUpdate) -> Self {
        self.apply(update);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_update(summary: &str) -> RecordUpdate {
        RecordUpdate::Profile {
            biography: Some(Biography {
                summary: summary.to_string(),
                full_text: format!("{} And more.", summary),
            }),
            listener_count: Some(1_000),
            play_count: Some(50_000),
            on_tour: Some(false),
            tags: ["electronic".to_string()].into(),
        }
    }

    #[test]
    fn test_base_record_is_empty_at_revision_zero() {
        let record = EnrichmentRecord::new(ArtistIdentity::new("a1", "Daft Punk"));

        assert_eq!(record.revision(), 0);
        assert!(record.biography.is_none());
        assert!(record.resolved_image.is_none());
        assert!(record.related_artists.is_empty());
    }

    #[test]
    fn test_apply_bumps_revision() {
        let mut record = EnrichmentRecord::new(ArtistIdentity::new("a1", "Daft Punk"));
        record.apply(profile_update("A French duo."));
        record.apply(RecordUpdate::ResolvedImage("https://img.example/dp".into()));

        assert_eq!(record.revision(), 2);
        assert_eq!(record.listener_count, Some(1_000));
        assert_eq!(
            record.resolved_image.as_deref(),
            Some("https://img.example/dp")
        );
    }

    #[test]
    fn test_populated_fields_never_regress() {
        let mut record = EnrichmentRecord::new(ArtistIdentity::new("a1", "Daft Punk"));
        record.apply(profile_update("First."));

        // A second profile merge must not replace what is already there.
        record.apply(RecordUpdate::Profile {
            biography: Some(Biography {
                summary: "Second.".to_string(),
                full_text: "Second.".to_string(),
            }),
            listener_count: None,
            play_count: None,
            on_tour: None,
            tags: ["house".to_string()].into(),
        });

        assert_eq!(record.biography.as_ref().unwrap().summary, "First.");
        assert_eq!(record.listener_count, Some(1_000));
        // Tags accumulate.
        assert!(record.tags.contains("electronic"));
        assert!(record.tags.contains("house"));
    }

    #[test]
    fn test_top_tracks_merge_keeps_first_ranking() {
        let mut record = EnrichmentRecord::new(ArtistIdentity::new("a1", "Daft Punk"));
        record.apply(RecordUpdate::TopTracks(vec![TrackRanking {
            name: "One More Time".to_string(),
            play_count: Some(48_000_000),
            listeners: None,
        }]));
        record.apply(RecordUpdate::TopTracks(vec![TrackRanking {
            name: "Replacement".to_string(),
            play_count: None,
            listeners: None,
        }]));

        assert_eq!(record.top_tracks.len(), 1);
        assert_eq!(record.top_tracks[0].name, "One More Time");
    }

    #[test]
    fn test_related_artists_append_in_arrival_order() {
        let mut record = EnrichmentRecord::new(ArtistIdentity::new("a1", "Daft Punk"));
        for name in ["Justice", "Air"] {
            record.apply(RecordUpdate::RelatedArtist(RelatedArtistLink {
                name: name.to_string(),
                image: None,
                catalog_href: Some(format!("/artist/{}", name)),
            }));
        }

        let names: Vec<_> = record
            .related_artists
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Justice", "Air"]);
    }

    #[test]
    fn test_merged_is_pure() {
        let base = EnrichmentRecord::new(ArtistIdentity::new("a1", "Daft Punk"));
        let merged = base.clone().merged(profile_update("Bio."));

        assert_eq!(base.revision(), 0);
        assert_eq!(merged.revision(), 1);
        assert!(base.biography.is_none());
        assert!(merged.biography.is_some());
    }

    #[test]
    fn test_identity_from_catalog_artist() {
        let artist: Artist = serde_json::from_str(
            r#"{
                "id": "a1",
                "name": "Daft Punk",
                "genres": ["french house", "electronic"],
                "images": [{"url": "https://img.example/dp"}]
            }"#,
        )
        .unwrap();

        let identity = ArtistIdentity::from(&artist);
        assert_eq!(identity.id, "a1");
        assert_eq!(identity.image_url.as_deref(), Some("https://img.example/dp"));
        assert!(identity.genres.contains("french house"));
    }
}
