//! Encyclopedia Summary Client
//!
//! Fetches page summaries from the Wikipedia REST API. Only the short
//! extract and the thumbnail are consumed; relevance filtering happens in
//! the image resolver, not here.
//!
//! ## API Endpoints
//!
//! - **Page summary**: `{base}/page/summary/{title}`

use crate::error::{MetadataError, Result};
use bridge_http::{HttpClient, HttpRequest};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page summary: short extract plus optional thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub extract: Option<String>,
    pub thumbnail: Option<String>,
}

/// Wikipedia REST API client
pub struct WikipediaClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    thumbnail: Option<ThumbnailPayload>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailPayload {
    source: String,
}

impl WikipediaClient {
    /// Creates a new encyclopedia client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `base_url` - REST API base URL, no trailing slash
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    /// Fetches the summary of the page titled exactly `title`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(PageSummary))` - Page exists
    /// - `Ok(None)` - No page under this title
    /// - `Err` - API error or network failure
    pub async fn page_summary(&self, title: &str) -> Result<Option<PageSummary>> {
        let url = format!(
            "{}/page/summary/{}",
            self.base_url,
            urlencoding::encode(title)
        );

        debug!("Querying encyclopedia summary: {}", url);

        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::Network(format!("Encyclopedia request failed: {}", e)))?;

        if response.status == 404 {
            debug!("No encyclopedia page for '{}'", title);
            return Ok(None);
        }

        if !response.is_success() {
            return Err(MetadataError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        let summary: SummaryResponse = serde_json::from_slice(&response.body).map_err(|e| {
            MetadataError::JsonParse(format!("Failed to parse summary response: {}", e))
        })?;

        Ok(Some(PageSummary {
            extract: summary.extract.filter(|text| !text.trim().is_empty()),
            thumbnail: summary.thumbnail.map(|t| t.source),
        }))
    }
}
