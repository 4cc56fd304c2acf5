//! Drives one generation from request to envelope.
//!
//! The loop is sequential: attempt `n + 1` is built from the outcome of
//! attempt `n`. A transport failure retries the same prompt; malformed output
//! retries with a self-corrected prompt. Whatever happens after the prompt is
//! composed ends in an envelope, never an error.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use forge_adapters::traits::{ChatRequest, GenerationClient, collect_completion};
use forge_memory::{ResultCache, ResultPersister};
use forge_primitives::{GenerationId, GenerationRequest, ResponseEnvelope, TopicMap};
use forge_prompts::{ContextStore, PromptBuilder, PromptDocument};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::attempt::{AttemptEvent, AttemptState, AttemptTracker, MAX_ATTEMPTS};
use crate::showcase::showcase_envelope;
use crate::validator::{ValidationFailure, validate_output};
use crate::{GenerationError, GenerationResult};

/// Marker prefixed to model-authored topic labels unless configured otherwise.
pub const DEFAULT_TOPIC_MARKER: &str = "🧠 ";

/// Last thing that went wrong in an attempt sequence.
#[derive(Debug, Clone)]
enum LastFailure {
    Transport(String),
    Malformed(ValidationFailure),
}

/// Terminal result of the attempt loop.
#[derive(Debug)]
enum LoopOutcome {
    Accepted {
        topics: TopicMap,
        prompt: PromptDocument,
    },
    Exhausted {
        failure: Option<LastFailure>,
        prompt: PromptDocument,
    },
}

/// Ties prompt composition, the model client, validation, and storage together.
///
/// Without a client the orchestrator runs in showcase mode and never makes a
/// call.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    client: Option<Arc<dyn GenerationClient>>,
    store: Arc<ContextStore>,
    builder: PromptBuilder,
    cache: Option<Arc<ResultCache>>,
    persister: Option<ResultPersister>,
    topic_marker: String,
}

impl fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field(
                "client",
                &self.client.as_ref().map(|client| {
                    let metadata = client.metadata();
                    format!("{}/{}", metadata.provider(), metadata.model())
                }),
            )
            .field("contexts", &self.store.contexts().len())
            .field("cache", &self.cache.as_ref().map(|cache| cache.path()))
            .field("persister", &self.persister)
            .field("topic_marker", &self.topic_marker)
            .finish_non_exhaustive()
    }
}

impl GenerationOrchestrator {
    /// Creates a showcase-mode orchestrator with no storage.
    #[must_use]
    pub fn new(store: Arc<ContextStore>, builder: PromptBuilder) -> Self {
        Self {
            client: None,
            store,
            builder,
            cache: None,
            persister: None,
            topic_marker: DEFAULT_TOPIC_MARKER.to_owned(),
        }
    }

    /// Uses `client` for model calls.
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn GenerationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Records accepted envelopes in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Writes one record per request through `persister`.
    #[must_use]
    pub fn with_persister(mut self, persister: ResultPersister) -> Self {
        self.persister = Some(persister);
        self
    }

    /// Overrides the topic label prefix.
    #[must_use]
    pub fn with_topic_marker(mut self, marker: impl Into<String>) -> Self {
        self.topic_marker = marker.into();
        self
    }

    /// Returns `true` when no client is configured.
    #[must_use]
    pub fn is_showcase(&self) -> bool {
        self.client.is_none()
    }

    /// Returns the context snippets and prompt templates in use.
    #[must_use]
    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Runs the pipeline for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownContextTag`] when a tag does not
    /// resolve; no call is made in that case. Every later failure is reported
    /// inside the returned envelope.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> GenerationResult<ResponseEnvelope> {
        let generation_id = GenerationId::random();
        let span = info_span!(
            "generation",
            %generation_id,
            prompt = request.prompt_label(),
            tags = request.tags().len()
        );
        self.generate_inner(request).instrument(span).await
    }

    async fn generate_inner(
        &self,
        request: &GenerationRequest,
    ) -> GenerationResult<ResponseEnvelope> {
        let prompt = self
            .builder
            .build(&self.store, request)
            .map_err(GenerationError::from)?;

        let Some(client) = self.client.as_deref() else {
            info!("no model credential, serving showcase envelope");
            return Ok(showcase_envelope(request, &prompt, &self.topic_marker));
        };

        match self.run_attempts(client, prompt).await {
            LoopOutcome::Accepted { topics, prompt } => {
                info!(topics = topics.len(), "generation accepted");
                let envelope = ResponseEnvelope::generated(
                    topics,
                    prompt.system_prompt(),
                    prompt.user_message(),
                )
                .with_context_note(ResponseEnvelope::context_note_for(request.tags()));

                self.cache_result(request, &envelope).await;
                self.persist_result(request, &envelope).await;
                Ok(envelope)
            }
            LoopOutcome::Exhausted { failure, prompt } => {
                let (envelope, model_answered) =
                    failure_envelope(failure.as_ref(), prompt.system_prompt());
                warn!(
                    error = envelope.error_message().unwrap_or_default(),
                    "generation failed after exhausting attempts"
                );
                if model_answered {
                    self.persist_result(request, &envelope).await;
                }
                Ok(envelope)
            }
        }
    }

    async fn run_attempts(
        &self,
        client: &dyn GenerationClient,
        mut prompt: PromptDocument,
    ) -> LoopOutcome {
        let mut tracker = AttemptTracker::new();
        let mut last_failure = None;

        while let AttemptState::Attempting(attempt) = tracker.state() {
            debug!(
                attempt,
                max_attempts = MAX_ATTEMPTS,
                corrections = prompt.corrections(),
                "calling model"
            );

            let event = match call_model(client, &prompt).await {
                Err(reason) => {
                    warn!(attempt, error = %reason, "model call failed");
                    last_failure = Some(LastFailure::Transport(reason));
                    AttemptEvent::TransportFailed
                }
                Ok(raw) => match validate_output(&raw, &self.topic_marker) {
                    Ok(topics) => {
                        tracker.transition(AttemptEvent::OutputAccepted);
                        return LoopOutcome::Accepted { topics, prompt };
                    }
                    Err(failure) => {
                        warn!(attempt, reason = failure.reason(), "model output rejected");
                        last_failure = Some(LastFailure::Malformed(failure));
                        AttemptEvent::OutputMalformed
                    }
                },
            };

            let next = tracker.transition(event);
            if event.requires_correction() && !next.is_terminal() {
                if let Some(LastFailure::Malformed(failure)) = &last_failure {
                    prompt.apply_self_correction(failure.reason(), failure.raw());
                }
            }
        }

        LoopOutcome::Exhausted {
            failure: last_failure,
            prompt,
        }
    }

    async fn cache_result(&self, request: &GenerationRequest, envelope: &ResponseEnvelope) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = ResultCache::key_for(request.prompt_label(), &Local::now());
        match cache.insert_and_flush(key.clone(), envelope.clone()).await {
            Ok(true) => debug!(%key, "result cached"),
            Ok(false) => debug!(%key, "cache key already present, keeping first entry"),
            Err(err) => warn!(%key, error = %err, "result served but not cached"),
        }
    }

    async fn persist_result(&self, request: &GenerationRequest, envelope: &ResponseEnvelope) {
        let Some(persister) = &self.persister else {
            return;
        };
        if let Err(err) = persister.persist(envelope, request, &Local::now()).await {
            warn!(error = %err, "result record could not be written");
        }
    }
}

async fn call_model(
    client: &dyn GenerationClient,
    prompt: &PromptDocument,
) -> Result<String, String> {
    let request = ChatRequest::new(prompt.system_prompt(), prompt.user_message());
    let stream = client.complete(request).await.map_err(|err| err.to_string())?;
    collect_completion(stream).await.map_err(|err| err.to_string())
}

/// Builds the failure envelope; the flag reports whether the model answered.
fn failure_envelope(failure: Option<&LastFailure>, prompt: &str) -> (ResponseEnvelope, bool) {
    match failure {
        Some(LastFailure::Malformed(failure)) => (
            ResponseEnvelope::failed(failure.to_string(), prompt).with_raw_output(failure.raw()),
            true,
        ),
        Some(LastFailure::Transport(reason)) => {
            (ResponseEnvelope::failed(reason.as_str(), prompt), false)
        }
        None => (ResponseEnvelope::failed("no attempt was made", prompt), false),
    }
}
