//! Logging setup shared by every binary in the workspace.
//!
//! Output goes through a `tracing_subscriber::fmt` subscriber. `RUST_LOG`
//! wins when it parses; otherwise the configured default directive applies.

#![warn(missing_docs, clippy::pedantic)]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Directive used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Line layout of emitted events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, human oriented output.
    Pretty,
}

/// Logging settings, usually read from the `[telemetry]` config table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset or invalid.
    pub default_directive: String,
    /// Output layout.
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_directive: DEFAULT_DIRECTIVE.to_owned(),
            format: LogFormat::default(),
        }
    }
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The default directive does not parse.
    #[error("invalid log directive {directive:?}: {reason}")]
    InvalidDirective {
        /// Offending directive.
        directive: String,
        /// Parser message.
        reason: String,
    },
    /// A global subscriber is already installed.
    #[error("tracing already initialised: {reason}")]
    AlreadyInitialised {
        /// Message from the subscriber registry.
        reason: String,
    },
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidDirective`] for an unparsable default
/// directive and [`TelemetryError::AlreadyInitialised`] when called twice.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(env_value.as_deref(), &config.default_directive)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|err| TelemetryError::AlreadyInitialised {
        reason: err.to_string(),
    })
}

fn resolve_filter(env_value: Option<&str>, default: &str) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = env_value
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
    {
        return Ok(filter);
    }

    EnvFilter::try_new(default).map_err(|err| TelemetryError::InvalidDirective {
        directive: default.to_owned(),
        reason: err.to_string(),
    })
}
