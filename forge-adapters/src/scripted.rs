//! In-process client that replays a fixed script of outcomes.
//!
//! Used to drive the orchestrator deterministically without a network, and
//! to record exactly which requests were sent.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures::stream;

use crate::traits::{
    AdapterError, AdapterResult, ChatRequest, ClientMetadata, CompletionChunk, CompletionStream,
    GenerationClient,
};

/// One scripted outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptStep {
    /// The model answers with the given raw text.
    Reply(String),
    /// The call fails at the transport level with the given reason.
    TransportFailure(String),
}

/// Client that pops one [`ScriptStep`] per call.
///
/// Calls beyond the end of the script fail with a transport error.
#[derive(Debug)]
pub struct ScriptedClient {
    metadata: ClientMetadata,
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    /// Creates a client replaying `steps` in order.
    #[must_use]
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = ScriptStep>,
    {
        Self {
            metadata: ClientMetadata::new("scripted", "replay"),
            steps: Mutex::new(steps.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a client that answers every listed reply in order.
    #[must_use]
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|reply| ScriptStep::Reply(reply.into())))
    }

    /// Returns the number of calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns a copy of every request received, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    async fn complete(&self, request: ChatRequest) -> AdapterResult<CompletionStream> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match step {
            Some(ScriptStep::Reply(text)) => {
                let chunk = CompletionChunk::new(text, true);
                Ok(Box::pin(stream::once(async move { Ok(chunk) })))
            }
            Some(ScriptStep::TransportFailure(reason)) => Err(AdapterError::transport(reason)),
            None => Err(AdapterError::transport("scripted client exhausted")),
        }
    }
}
