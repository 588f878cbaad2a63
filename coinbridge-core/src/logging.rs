//! Structured logging setup built on `tracing`.
//!
//! The library itself only emits events (`debug!`/`info!`/`warn!` at
//! cache, dispatch and classification boundaries); installing a
//! subscriber is the application's choice. These helpers cover the
//! common case.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational events (default).
    #[default]
    Info,
    /// Per-request debugging.
    Debug,
    /// Everything, including payload-level tracing.
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// Newline-delimited JSON for log shippers.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Verbosity; `RUST_LOG` overrides it when set.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Include span targets in output.
    pub with_target: bool,
}

/// Installs the global tracing subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] when that is a legitimate possibility.
pub fn init_logging(config: &LogConfig) {
    try_init_logging(config).expect("global tracing subscriber already installed");
}

/// Installs the global tracing subscriber, reporting failure instead of
/// panicking.
pub fn try_init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| Error::exchange(format!("failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
        assert_eq!(LogLevel::default().as_filter(), "info");
    }

    #[test]
    fn test_try_init_is_idempotent_enough() {
        let config = LogConfig::default();
        // First call may or may not win the race with other tests; the
        // second must report failure rather than panic.
        let _ = try_init_logging(&config);
        assert!(try_init_logging(&config).is_err());
    }
}
