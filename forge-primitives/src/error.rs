//! Shared error definitions for forge primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the forge workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided generation identifier could not be parsed.
    #[error("invalid generation id: {source}")]
    InvalidGenerationId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// An envelope could not be reconstructed from its flat JSON form.
    #[error("invalid envelope: {reason}")]
    InvalidEnvelope {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl Error {
    /// Convenience constructor for envelope decoding failures.
    #[must_use]
    pub fn invalid_envelope(reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            reason: reason.into(),
        }
    }
}
