//! # Core Runtime
//!
//! Shared runtime infrastructure for the listening-stats client core:
//! logging bootstrap and configuration for the external services the
//! client talks to.

pub mod config;
pub mod error;
pub mod logging;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
