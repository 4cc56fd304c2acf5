//! Core shared types for the content forge generation pipeline.

#![warn(missing_docs, clippy::pedantic)]

mod envelope;
mod error;
mod ids;
mod request;
mod topics;
mod tweet;

/// Outward response contract returned to callers, success or failure.
pub use envelope::{EnvelopeKind, ResponseEnvelope, reserved_keys};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifier attached to every generation run.
pub use ids::GenerationId;
/// Inbound generation request.
pub use request::GenerationRequest;
/// Ordered topic label to generated content mapping.
pub use topics::TopicMap;
/// Immutable source post from the ingested dataset.
pub use tweet::Tweet;
