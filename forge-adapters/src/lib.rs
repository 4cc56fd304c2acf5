//! Generation clients used by the orchestrator.
//!
//! [`traits`] defines the boundary every client implements; [`openai`] talks
//! to the hosted chat-completions API and [`scripted`] replays canned
//! outcomes in-process.

#![warn(missing_docs, clippy::pedantic)]

pub mod openai;
pub mod scripted;
pub mod traits;

mod http_client;
