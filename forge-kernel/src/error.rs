//! Errors that stop a generation before any model call is made.

use forge_prompts::PromptError;
use thiserror::Error;

/// Errors surfaced to the caller instead of an envelope.
///
/// Anything that goes wrong once attempts have started is folded into a
/// failure envelope instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A requested tag has no context snippet.
    #[error("unknown context tag: {tag}")]
    UnknownContextTag {
        /// Offending tag.
        tag: String,
    },
    /// The prompt could not be composed for another reason.
    #[error("prompt composition failed: {0}")]
    Prompt(#[source] PromptError),
}

impl From<PromptError> for GenerationError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::UnknownContextTag { tag } => Self::UnknownContextTag { tag },
            other => Self::Prompt(other),
        }
    }
}

impl GenerationError {
    /// Returns `true` when the caller sent something invalid.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownContextTag { .. })
    }
}

/// Result alias for generation entry points.
pub type GenerationResult<T> = Result<T, GenerationError>;
