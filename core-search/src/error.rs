use crate::session::SearchCategory;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Catalog API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),

    #[error("Continuation response is missing the {category} page")]
    MissingCategory { category: SearchCategory },

    #[error(transparent)]
    Transport(#[from] bridge_http::TransportError),
}

pub type Result<T> = std::result::Result<T, SearchError>;
