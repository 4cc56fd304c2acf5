//! Shared generation client traits and data structures.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used by generation clients.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Streaming response emitted by [`GenerationClient::complete`].
pub type CompletionStream = Pin<Box<dyn Stream<Item = AdapterResult<CompletionChunk>> + Send>>;

/// Error type shared by client implementations.
///
/// Every variant counts as a transport failure for the orchestrator: the
/// attempt is retried with the prompt unchanged.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Client is misconfigured or missing credentials.
    #[error("adapter not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The supplied request was invalid for the target model.
    #[error("invalid completion request: {reason}")]
    InvalidRequest {
        /// Reason describing why the request could not be processed.
        reason: String,
    },

    /// Transport-level failures (network, protocol, timeout).
    #[error("adapter transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The provider rejected the request due to rate limiting.
    #[error("adapter rate limited (retry after {retry_after:?})")]
    RateLimited {
        /// Suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The provider returned an error status or an undecodable body.
    #[error("adapter response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },
}

impl AdapterError {
    /// Convenience constructor for invalid requests.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for provider response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing a client instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientMetadata {
    provider: &'static str,
    model: String,
}

impl ClientMetadata {
    /// Creates metadata for the supplied provider and model identifier.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Returns the provider identifier (e.g., "openai").
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Returns the configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Author of one part of a [`ChatRequest`].
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The steering instruction.
    System,
    /// The content the model works on.
    User,
}

/// One model call: a system instruction and a single user message.
///
/// The pipeline never builds multi-turn conversations; a self-correction
/// replaces both parts instead of appending turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    system_prompt: String,
    user_message: String,
}

impl ChatRequest {
    /// Creates a request from its two parts.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
        }
    }

    /// Returns the system instruction.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Returns the user message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Returns both parts in send order, system first.
    #[must_use]
    pub fn messages(&self) -> [(MessageRole, &str); 2] {
        [
            (MessageRole::System, self.system_prompt.as_str()),
            (MessageRole::User, self.user_message.as_str()),
        ]
    }
}

/// Streaming chunk returned by a client.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CompletionChunk {
    /// Partial text delta emitted by the provider.
    pub delta: String,
    /// Whether the generation is complete.
    pub done: bool,
}

impl CompletionChunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(delta: impl Into<String>, done: bool) -> Self {
        Self {
            delta: delta.into(),
            done,
        }
    }
}

/// Boundary to the external generative model. One call per attempt.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Returns basic metadata describing the client instance.
    fn metadata(&self) -> &ClientMetadata;

    /// Executes the request, returning a streaming response.
    async fn complete(&self, request: ChatRequest) -> AdapterResult<CompletionStream>;
}

/// Drains a completion stream into a single string.
///
/// Stops at the first chunk flagged `done`.
///
/// # Errors
///
/// Propagates the first error yielded by the stream.
pub async fn collect_completion(mut stream: CompletionStream) -> AdapterResult<String> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        text.push_str(&chunk.delta);
        if chunk.done {
            break;
        }
    }
    Ok(text)
}
