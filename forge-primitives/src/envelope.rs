//! Response envelope returned to callers.
//!
//! The envelope is a flat JSON object: a status entry, optional context
//! note, the generated topics, and echoes of what was sent to the model.
//! Failure envelopes carry an error message and the prompt in use instead.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{Error, TopicMap};

/// Fixed keys and labels that make up the envelope frame.
///
/// Model-authored topics must never collide with any of these.
pub mod reserved_keys {
    /// Status key of a successful generation.
    pub const GENERATED_STATUS: &str = "✅ Loading done!";
    /// Status value of a successful generation.
    pub const GENERATED_DETAIL: &str = "Here are the results...";
    /// Status key of a showcase envelope.
    pub const SHOWCASE_STATUS: &str = "✅ This is a showcase!";
    /// Status value of a showcase envelope.
    pub const SHOWCASE_DETAIL: &str = "Here are some dummy results...";
    /// Status key of a terminal failure.
    pub const FAILURE_STATUS: &str = "⚠️ Error occured";
    /// Status value of a terminal failure.
    pub const FAILURE_DETAIL: &str = "Something went wrong!";
    /// Key carrying the context note.
    pub const CONTEXT: &str = "✨ Context";
    /// Key echoing the system prompt of a successful generation.
    pub const PROMPT: &str = "📝 Prompt";
    /// Key echoing the user message of a successful generation.
    pub const INPUT: &str = "📝 Input";
    /// Key carrying the error message of a failure.
    pub const ERROR: &str = "Error";
    /// Key echoing the prompt that was in use when a failure occurred.
    pub const FAILURE_PROMPT: &str = "Prompt";
    /// Key echoing the last raw model output of a failure.
    pub const RESULTS: &str = "📝 Results";

    /// Every reserved key.
    pub const ALL: [&str; 9] = [
        GENERATED_STATUS,
        SHOWCASE_STATUS,
        FAILURE_STATUS,
        CONTEXT,
        PROMPT,
        INPUT,
        ERROR,
        FAILURE_PROMPT,
        RESULTS,
    ];

    /// Returns `true` when `key` is part of the envelope frame.
    #[must_use]
    pub fn is_reserved(key: &str) -> bool {
        ALL.contains(&key)
    }
}

use reserved_keys as keys;

/// Which terminal path produced an envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// The model produced a valid topic map.
    Generated,
    /// No credential was configured; fixed illustrative content.
    Showcase,
    /// The attempt budget was exhausted.
    Failed,
}

impl EnvelopeKind {
    /// Returns the status key rendered for this kind.
    #[must_use]
    pub const fn status_label(self) -> &'static str {
        match self {
            Self::Generated => keys::GENERATED_STATUS,
            Self::Showcase => keys::SHOWCASE_STATUS,
            Self::Failed => keys::FAILURE_STATUS,
        }
    }

    /// Returns the status value rendered for this kind.
    #[must_use]
    pub const fn status_detail(self) -> &'static str {
        match self {
            Self::Generated => keys::GENERATED_DETAIL,
            Self::Showcase => keys::SHOWCASE_DETAIL,
            Self::Failed => keys::FAILURE_DETAIL,
        }
    }
}

/// Structured response describing either generated topics or a failure.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ResponseEnvelope {
    kind: EnvelopeKind,
    context_note: Option<String>,
    topics: TopicMap,
    prompt_echo: String,
    input_echo: Option<String>,
    error_message: Option<String>,
    raw_output: Option<String>,
}

impl ResponseEnvelope {
    /// Creates a success envelope.
    #[must_use]
    pub fn generated(
        topics: TopicMap,
        prompt_echo: impl Into<String>,
        input_echo: impl Into<String>,
    ) -> Self {
        Self {
            kind: EnvelopeKind::Generated,
            context_note: None,
            topics,
            prompt_echo: prompt_echo.into(),
            input_echo: Some(input_echo.into()),
            error_message: None,
            raw_output: None,
        }
    }

    /// Creates a showcase envelope.
    #[must_use]
    pub fn showcase(topics: TopicMap, prompt_echo: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Showcase,
            context_note: None,
            topics,
            prompt_echo: prompt_echo.into(),
            input_echo: None,
            error_message: None,
            raw_output: None,
        }
    }

    /// Creates a terminal failure envelope.
    #[must_use]
    pub fn failed(error_message: impl Into<String>, prompt_echo: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Failed,
            context_note: None,
            topics: TopicMap::new(),
            prompt_echo: prompt_echo.into(),
            input_echo: None,
            error_message: Some(error_message.into()),
            raw_output: None,
        }
    }

    /// Attaches a context note. Ignored on failure envelopes when rendered.
    #[must_use]
    pub fn with_context_note(mut self, note: Option<String>) -> Self {
        self.context_note = note;
        self
    }

    /// Attaches the last raw model output to a failure envelope.
    #[must_use]
    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }

    /// Builds the context note for the supplied tags, `None` when empty.
    #[must_use]
    pub fn context_note_for(tags: &[String]) -> Option<String> {
        if tags.is_empty() {
            None
        } else {
            Some(format!("Including context {}", tags.join(", ")))
        }
    }

    /// Returns the kind of envelope.
    #[must_use]
    pub const fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    /// Returns `true` for terminal failure envelopes.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.kind, EnvelopeKind::Failed)
    }

    /// Returns the status key.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        self.kind.status_label()
    }

    /// Returns the context note.
    #[must_use]
    pub fn context_note(&self) -> Option<&str> {
        self.context_note.as_deref()
    }

    /// Returns the generated topics.
    #[must_use]
    pub fn topics(&self) -> &TopicMap {
        &self.topics
    }

    /// Returns the echoed prompt.
    #[must_use]
    pub fn prompt_echo(&self) -> &str {
        &self.prompt_echo
    }

    /// Returns the echoed user message.
    #[must_use]
    pub fn input_echo(&self) -> Option<&str> {
        self.input_echo.as_deref()
    }

    /// Returns the failure message.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the last raw model output attached to a failure.
    #[must_use]
    pub fn raw_output(&self) -> Option<&str> {
        self.raw_output.as_deref()
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(self.kind.status_label(), self.kind.status_detail())?;

        if self.kind == EnvelopeKind::Failed {
            map.serialize_entry(keys::ERROR, self.error_message.as_deref().unwrap_or_default())?;
            map.serialize_entry(keys::FAILURE_PROMPT, &self.prompt_echo)?;
            if let Some(raw) = &self.raw_output {
                map.serialize_entry(keys::RESULTS, raw)?;
            }
            return map.end();
        }

        if let Some(note) = &self.context_note {
            map.serialize_entry(keys::CONTEXT, note)?;
        }
        for (label, content) in self.topics.iter() {
            map.serialize_entry(label, content)?;
        }
        map.serialize_entry(keys::PROMPT, &self.prompt_echo)?;
        if let Some(input) = &self.input_echo {
            map.serialize_entry(keys::INPUT, input)?;
        }
        map.end()
    }
}

impl TryFrom<Map<String, Value>> for ResponseEnvelope {
    type Error = Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let kind = if map.contains_key(keys::GENERATED_STATUS) {
            EnvelopeKind::Generated
        } else if map.contains_key(keys::SHOWCASE_STATUS) {
            EnvelopeKind::Showcase
        } else if map.contains_key(keys::FAILURE_STATUS) {
            EnvelopeKind::Failed
        } else {
            return Err(Error::invalid_envelope("missing status entry"));
        };

        let mut envelope = Self {
            kind,
            context_note: None,
            topics: TopicMap::new(),
            prompt_echo: String::new(),
            input_echo: None,
            error_message: None,
            raw_output: None,
        };

        for (key, value) in map {
            let Value::String(text) = value else {
                return Err(Error::invalid_envelope(format!(
                    "entry `{key}` is not a string"
                )));
            };
            match key.as_str() {
                keys::GENERATED_STATUS | keys::SHOWCASE_STATUS | keys::FAILURE_STATUS => {}
                keys::CONTEXT => envelope.context_note = Some(text),
                keys::PROMPT | keys::FAILURE_PROMPT => envelope.prompt_echo = text,
                keys::INPUT => envelope.input_echo = Some(text),
                keys::ERROR => envelope.error_message = Some(text),
                keys::RESULTS => envelope.raw_output = Some(text),
                _ => {
                    envelope.topics.insert_if_absent(key, text);
                }
            }
        }

        Ok(envelope)
    }
}
