//! HTTP request seam
//!
//! Every upstream this client talks to (the catalog, the metadata
//! service, the cross-reference service, and the encyclopedia) is a
//! read-only JSON API, so the request type models authenticated GETs and
//! nothing else. Implementations of [`HttpClient`] own pooling, TLS, and
//! transient-failure retry; credentials are attached per request.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, TransportError};

/// A GET request against one of the upstream JSON APIs.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attaches the catalog bearer credential.
    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Response as delivered by the transport, body fully buffered.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| TransportError::InvalidResponse(format!("malformed JSON body: {}", e)))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Seconds the server asked us to back off, from the `Retry-After`
    /// header. Falls back to `default_seconds` when the header is absent
    /// or not a plain number.
    pub fn retry_after_seconds(&self, default_seconds: u64) -> u64 {
        self.headers
            .get("Retry-After")
            .or_else(|| self.headers.get("retry-after"))
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default_seconds)
    }
}

/// Backoff schedule for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub initial_backoff: Duration,
    /// Ceiling for the doubled delay.
    pub backoff_cap: Duration,
}

impl RetryPolicy {
    /// Delay to sleep after the given 1-based attempt failed.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let doubled = self.initial_backoff * 2u32.saturating_pow(attempt.saturating_sub(1));
        doubled.min(self.backoff_cap)
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_backoff: Duration::from_millis(100),
            backoff_cap: Duration::from_secs(30),
        }
    }
}

/// Async transport the service clients are written against.
///
/// # Example
///
/// ```ignore
/// use bridge_http::{HttpClient, HttpRequest};
///
/// async fn fetch(client: &dyn HttpClient) -> bridge_http::Result<serde_json::Value> {
///     let request = HttpRequest::get("https://api.example.com/data")
///         .bearer_token("token");
///     client.execute(request).await?.json()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes a request, retrying transient failures per the
    /// implementation's default policy.
    ///
    /// # Errors
    ///
    /// Fails when the connection cannot be established, the request times
    /// out, or the body cannot be read. A response with a non-2xx status
    /// is not an error at this layer.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Executes a request under an explicit retry policy.
    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        // Implementations with real retry logic override this.
        let _ = policy;
        self.execute(request).await
    }
}
