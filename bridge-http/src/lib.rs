//! # HTTP Bridge
//!
//! Transport seam between the client core and the external services it
//! consumes. The `HttpClient` trait abstracts the authenticated request
//! layer so that core crates can be exercised against mock transports,
//! while `ReqwestHttpClient` provides the production implementation.

pub mod error;
pub mod http;
pub mod transport;

pub use error::{Result, TransportError};
pub use http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
pub use transport::ReqwestHttpClient;
