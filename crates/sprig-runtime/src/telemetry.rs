//! Tracing subscriber setup
//!
//! Use `RUST_LOG` to override the default filter (`sprig=info`).

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "sprig=info";

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Build the filter from `RUST_LOG`, falling back to `default`
pub fn env_filter(default: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default)
            .map_err(|e| TelemetryError::InvalidFilter(e.to_string())),
    }
}

/// Install the global fmt subscriber
pub fn init_tracing(format: LogFormat) -> Result<(), TelemetryError> {
    let filter = env_filter(DEFAULT_FILTER)?;
    let result = match format {
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
    };
    result.map_err(|_| TelemetryError::AlreadyInitialized)
}
