//! Prompt composition for the generation pipeline.
//!
//! [`store`] loads named context snippets and prompt templates from disk,
//! [`template`] renders `{{variable}}` placeholders, and [`builder`] turns a
//! [`GenerationRequest`](forge_primitives::GenerationRequest) into the
//! [`PromptDocument`] sent to the model.

#![warn(missing_docs, clippy::pedantic)]

pub mod builder;
pub mod document;
mod error;
pub mod store;
pub mod template;

pub use builder::{CONTEXT_LEAD_IN, DEFAULT_FORMAT_CONTRACT, PromptBuilder};
pub use document::{PromptDocument, SELF_CORRECTION_DIRECTIVE};
pub use error::{PromptError, PromptResult};
pub use store::{ContextStore, TextLibrary};
pub use template::{PromptTemplate, TemplateError, TemplateResult};
