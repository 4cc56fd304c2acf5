//! The generation pipeline.
//!
//! [`GenerationOrchestrator`] composes a prompt, calls the model up to
//! [`MAX_ATTEMPTS`] times, validates each answer with [`validate_output`],
//! and stores accepted results. The attempt budget itself lives in
//! [`attempt`] so it can be tested without a client.

#![warn(missing_docs, clippy::pedantic)]

pub mod attempt;
mod error;
pub mod orchestrator;
pub mod showcase;
pub mod validator;

pub use attempt::{AttemptEvent, AttemptState, AttemptTracker, MAX_ATTEMPTS};
pub use error::{GenerationError, GenerationResult};
pub use orchestrator::{DEFAULT_TOPIC_MARKER, GenerationOrchestrator};
pub use showcase::showcase_envelope;
pub use validator::{NO_USABLE_TOPICS, ValidationFailure, validate_output};
