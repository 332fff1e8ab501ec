use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    JsonParse(String),

    #[error("Remote API error: {0}")]
    RemoteApi(String),

    #[error("{provider} rate limited, retry after {retry_after_seconds} seconds")]
    RateLimited {
        provider: String,
        retry_after_seconds: u64,
    },

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
