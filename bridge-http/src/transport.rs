//! Default reqwest-backed transport
//!
//! One pooled client per instance. Transient failures (connect errors,
//! timeouts, 429 and 5xx statuses) are retried with doubling backoff;
//! the final outcome is returned as-is, so callers always see the real
//! terminal status rather than a synthesized error.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("listening-stats-core/", env!("CARGO_PKG_VERSION"));

/// Pooled HTTP transport over reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Builds a transport whose requests time out after `timeout` unless
    /// a request carries its own.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client construction cannot fail with these options");

        Self { client }
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(request.url.clone())
            } else {
                TransportError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::InvalidResponse(format!("body read failed: {}", e)))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Statuses worth retrying: throttling and server-side trouble.
fn is_retryable_status(status: u16) -> bool {
    status == 429 || status >= 500
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let mut attempt = 1;
        loop {
            debug!(attempt, url = %request.url, "Executing HTTP request");

            let outcome = self.send_once(&request).await;
            let last_attempt = attempt >= policy.attempts.max(1);

            match outcome {
                Ok(response) if is_retryable_status(response.status) && !last_attempt => {
                    warn!(
                        status = response.status,
                        attempt,
                        url = %request.url,
                        "Retryable status, backing off"
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if last_attempt => return Err(e),
                Err(e) => {
                    warn!(error = %e, attempt, url = %request.url, "Request failed, backing off");
                }
            }

            sleep(policy.backoff_after(attempt)).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_constructs() {
        let _client = ReqwestHttpClient::new();
        let _custom = ReqwestHttpClient::with_timeout(Duration::from_secs(5));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(404));
    }
}
