//! `OpenAI` chat-completions client.

use std::{env, fmt, time::Duration};

use async_trait::async_trait;
use futures::stream;
use hyper::body::to_bytes;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use hyper::{Body, Request, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::http_client::{HttpsClient, build_https_client};
use crate::traits::{
    AdapterError, AdapterResult, ChatRequest, ClientMetadata, CompletionChunk, CompletionStream,
    GenerationClient, MessageRole,
};

/// Environment variable holding the API credential.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Configuration for the `OpenAI` client.
#[derive(Clone)]
pub struct OpenAiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key_present", &self.api_key.is_some())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_temperature", &self.default_temperature)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: "https://api.openai.com/".to_owned(),
            timeout: Duration::from_secs(60),
            default_temperature: None,
        }
    }

    /// Loads the API key from the `OPENAI_API_KEY` environment variable.
    ///
    /// An empty variable counts as absent.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut cfg = Self::new(model);
        cfg.api_key = env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        cfg
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the sampling temperature sent with every call; the provider default applies otherwise.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns `true` when a credential is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Client that calls the `OpenAI` chat-completions API over HTTPS.
pub struct OpenAiClient {
    client: HttpsClient,
    endpoint: Uri,
    metadata: ClientMetadata,
    api_key: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Constructs a new client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API key is missing or
    /// the endpoint cannot be formed.
    pub fn new(config: OpenAiConfig) -> AdapterResult<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| AdapterError::configuration("OpenAI client requires an API key"))?;

        let metadata = ClientMetadata::new("openai", config.model.clone());
        let endpoint = format!("{}v1/chat/completions", config.base_url)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid OpenAI endpoint: {err}"))
            })?;

        Ok(Self {
            client: build_https_client(),
            endpoint,
            metadata,
            api_key,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request<'a>(&self, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
        let messages = request
            .messages()
            .into_iter()
            .map(|(role, content)| OpenAiMessage { role, content })
            .collect();

        ChatCompletionRequest {
            model: self.metadata.model().to_owned(),
            messages,
            temperature: self.default_temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    async fn complete(&self, request: ChatRequest) -> AdapterResult<CompletionStream> {
        let payload = self.build_request(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode OpenAI request: {err}"))
        })?;

        let request = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build OpenAI request: {err}"))
            })?;

        debug!(model = self.metadata.model(), "sending chat completion");

        let response = timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| AdapterError::transport("OpenAI request timed out"))?
            .map_err(|err| AdapterError::transport(format!("OpenAI request failed: {err}")))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);

        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            AdapterError::transport(format!("failed to read OpenAI response: {err}"))
        })?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes);
            return Err(AdapterError::response(format!(
                "OpenAI returned {status}: {reason}"
            )));
        }

        let content = extract_content(&bytes)?;
        let stream = stream::once(async move { Ok(CompletionChunk::new(content, true)) });
        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pulls the first choice's content out of a completion body.
fn extract_content(bytes: &[u8]) -> AdapterResult<String> {
    let response: ChatCompletionResponse = serde_json::from_slice(bytes)
        .map_err(|err| AdapterError::response(format!("failed to decode OpenAI response: {err}")))?;

    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.and_then(|message| message.content))
        .ok_or_else(|| AdapterError::response("OpenAI response contained no choices"))
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn sanitize_base_url(input: &str) -> AdapterResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(
            "OpenAI base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid OpenAI base URL: {err}")))?;
    Ok(base)
}
