//! Structured logging setup for the command-line tool.
//!
//! Logs go to stderr so stdout carries only the maze or the path.

use std::str::FromStr;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::{Error, Result};

/// Environment variable holding a filter directive; falls back to `RUST_LOG`
pub const LOG_ENV: &str = "MAZE_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Configuration(format!(
                "invalid log format '{}' (expected 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Build the level filter.
///
/// Priority: `MAZE_LOG`, then `RUST_LOG`, then `default_level`.
pub fn build_filter(default_level: &str) -> Result<EnvFilter> {
    let directive = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directive)
        .map_err(|e| Error::Configuration(format!("invalid log filter '{}': {}", directive, e)))
}

/// Install the global subscriber
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let filter = build_filter(default_level)?;
    let registry = Registry::default().with(filter);

    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| Error::Configuration(format!("failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_default_level_filter() {
        if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
            assert!(build_filter("maze_runner=debug").is_ok());
        }
    }
}
