//! HTTP surface of the content forge service.
//!
//! [`router::handle`] maps requests onto [`AppState`]; [`bootstrap`] builds
//! that state from a [`ForgeConfig`](forge_config::ForgeConfig).

#![warn(missing_docs, clippy::pedantic)]

pub mod bootstrap;
pub mod router;
mod state;

pub use state::{AppState, DatasetSource};
