//! # Metadata & Enrichment Module
//!
//! Enriches catalog artists with data the catalog itself does not carry.
//!
//! ## Overview
//!
//! This module handles:
//! - Artist profile lookup on the metadata service (biography, listening
//!   statistics, tags, tour flag, similar artists)
//! - Encyclopedia image resolution with a music-relevance filter
//! - Cross-catalog identity resolution (name to cross-reference id to
//!   primary-catalog id)
//! - The progressive enrichment record and the pipeline that fills it

pub mod error;
pub mod identity_bridge;
pub mod image_resolver;
pub mod pipeline;
pub mod providers;
pub mod record;

pub use error::{MetadataError, Result};
pub use identity_bridge::IdentityBridge;
pub use image_resolver::ImageResolver;
pub use pipeline::ArtistEnrichmentPipeline;
pub use record::{
    ArtistIdentity, Biography, EnrichmentRecord, RecordUpdate, RelatedArtistLink, TrackRanking,
};
