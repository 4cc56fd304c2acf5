//! Error types for the storage subsystem.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by storage components.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure while reading or writing a file.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Source [`std::io::Error`].
        source: std::io::Error,
    },
    /// Serialization or deserialization error.
    #[error("serialization error on {path}: {source}")]
    Serialization {
        /// File involved.
        path: PathBuf,
        /// Source [`serde_json::Error`].
        source: serde_json::Error,
    },
    /// No free record name was found for the current second.
    #[error("no free record name under {dir} for stamp {stamp}")]
    NameExhausted {
        /// Results directory.
        dir: PathBuf,
        /// Compact timestamp that was exhausted.
        stamp: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
