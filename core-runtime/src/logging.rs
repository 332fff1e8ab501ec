//! Logging bootstrap
//!
//! Wires the `tracing-subscriber` stack once per process: an `EnvFilter`
//! driven by `RUST_LOG` (falling back to the configured directive) under
//! one of three fmt layers.
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_filter("info,core_search=debug");
//!
//! init_logging(config).expect("Failed to initialize logging");
//! tracing::info!("client core started");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, colorized; the development default.
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
    /// Single-line text, for terminals in production.
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Directive in `RUST_LOG` syntax, e.g. `"info,core_metadata=debug"`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured directive when set. The second
/// call in a process finds the global slot taken and reports it as
/// [`Error::Internal`] rather than panicking.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::Config(format!("bad log filter directive: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };

    installed.map_err(|e| Error::Internal(format!("logging already initialized: {}", e)))?;

    tracing::debug!(format = ?config.format, filter = %config.filter, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_filter("debug");

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "debug");
    }

    #[test]
    fn test_repeated_init_errors_instead_of_panicking() {
        // Whichever test wins the global slot, the loser must get an Err.
        let first = init_logging(LoggingConfig::default().with_filter("warn"));
        let second = init_logging(LoggingConfig::default().with_filter("warn"));
        assert!(first.is_ok() || second.is_err());
    }
}
