//! External metadata providers
//!
//! One client per upstream service. All of them treat "no match" as a
//! value (`Ok(None)`), never as an error.

pub mod lastfm;
pub mod musicbrainz;
pub mod wikipedia;

use std::time::{Duration, Instant};
use tracing::debug;

/// Simple rate limiter to enforce delay between requests
pub(crate) struct RateLimiter {
    last_request: Option<Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    pub(crate) fn new(delay_ms: u64) -> Self {
        Self {
            last_request: None,
            min_delay: Duration::from_millis(delay_ms),
        }
    }

    pub(crate) async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}
