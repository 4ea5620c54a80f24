//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::{Result, WeatherGuardError};
use tracing_subscriber::EnvFilter;

/// Build the level filter. `RUST_LOG` takes precedence over the configured level.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber, writing to stderr.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    installed.map_err(|e| {
        WeatherGuardError::config(format!("Failed to initialize logging: {e}"))
    })
}
