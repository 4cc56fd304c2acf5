//! Decoding of raw model output into a topic map.
//!
//! The model is asked for a flat JSON object of topic label to content. This
//! step accepts exactly that (optionally wrapped in one Markdown code fence),
//! rewrites the labels, and reports anything else as a [`ValidationFailure`]
//! carrying the raw text for the self-correction prompt.

use forge_primitives::{TopicMap, reserved_keys};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reason reported when decoding succeeds but nothing survives filtering.
pub const NO_USABLE_TOPICS: &str = "no usable topics";

/// Model output that could not be turned into topics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed model output: {reason}")]
pub struct ValidationFailure {
    reason: String,
    raw: String,
}

impl ValidationFailure {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_owned(),
        }
    }

    /// Decoder message, fed back to the model.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The unmodified output that failed.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Decodes `raw` and labels every topic with `marker`.
///
/// Keys are normalised (`_` to space, trimmed) and prefixed; keys that are
/// empty or equal to an envelope key, before or after normalisation, are
/// dropped. The first occurrence of a normalised key wins.
///
/// # Errors
///
/// Returns [`ValidationFailure`] when the text is not a JSON object, a value
/// is not a string, or no topic survives filtering.
pub fn validate_output(raw: &str, marker: &str) -> Result<TopicMap, ValidationFailure> {
    let body = strip_code_fence(raw);
    let decoded: Map<String, Value> =
        serde_json::from_str(body).map_err(|err| ValidationFailure::new(err.to_string(), raw))?;

    let mut topics = TopicMap::new();
    for (key, value) in decoded {
        let Value::String(content) = value else {
            return Err(ValidationFailure::new(
                format!("value for {key:?} is not a string"),
                raw,
            ));
        };
        if let Some(label) = topic_label(&key, marker) {
            topics.insert_if_absent(label, content);
        }
    }

    if topics.is_empty() {
        return Err(ValidationFailure::new(NO_USABLE_TOPICS, raw));
    }
    Ok(topics)
}

fn topic_label(key: &str, marker: &str) -> Option<String> {
    if reserved_keys::is_reserved(key) {
        return None;
    }
    let normalized = key.replace('_', " ");
    let normalized = normalized.trim();
    if normalized.is_empty() || reserved_keys::is_reserved(normalized) {
        return None;
    }
    let label = format!("{marker}{normalized}");
    (!reserved_keys::is_reserved(&label)).then_some(label)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line; a
    // single-line fence has its info string glued to the body, if any.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
