//! Durable state for the generation pipeline.
//!
//! - [`cache`]: the process-wide result cache, one JSON file rewritten in full
//!   on every write.
//! - [`persister`]: one JSON record per request in a results directory.
//! - [`dataset`]: the pre-merged list of source posts.

#![warn(missing_docs, clippy::pedantic)]

pub mod cache;
pub mod dataset;
mod error;
pub mod persister;

pub use cache::ResultCache;
pub use dataset::Dataset;
pub use error::{StoreError, StoreResult};
pub use persister::ResultPersister;
