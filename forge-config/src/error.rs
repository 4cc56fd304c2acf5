use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        /// File being parsed, `<string>` for inline input.
        path: PathBuf,
        /// Parser error.
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
