//! Error types for prompt composition.

use std::path::PathBuf;

use thiserror::Error;

use crate::TemplateError;

/// Result alias for prompt operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors emitted while loading snippets or composing prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    /// A request named a context tag that no snippet provides.
    #[error("unknown context tag `{tag}`")]
    UnknownContextTag {
        /// The unresolved tag.
        tag: String,
    },
    /// The output-format contract could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A snippet directory or file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Source [`std::io::Error`].
        source: std::io::Error,
    },
    /// The user message could not be encoded.
    #[error("failed to encode user message: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PromptError {
    /// Helper to construct an unknown tag error.
    #[must_use]
    pub fn unknown_tag(tag: impl Into<String>) -> Self {
        Self::UnknownContextTag { tag: tag.into() }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
