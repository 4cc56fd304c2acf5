//! Fixed envelope served when no model credential is configured.

use forge_primitives::{GenerationRequest, ResponseEnvelope, TopicMap};
use forge_prompts::PromptDocument;

const SHOWCASE_TOPICS: [(&str, &str); 3] = [
    (
        "Product launch",
        "Our new release is live. Faster search, cleaner results, and a fresh look. Try it today!",
    ),
    (
        "Community spotlight",
        "Huge thanks to everyone who shared feedback this week. You shape what we build next.",
    ),
    (
        "Behind the scenes",
        "A peek at how the team ships: small changes, reviewed carefully, released often.",
    ),
];

/// Builds the showcase envelope for `request` without calling any model.
///
/// The composed prompt is echoed so callers can still inspect what would
/// have been sent.
#[must_use]
pub fn showcase_envelope(
    request: &GenerationRequest,
    prompt: &PromptDocument,
    marker: &str,
) -> ResponseEnvelope {
    let topics: TopicMap = SHOWCASE_TOPICS
        .iter()
        .map(|(label, content)| (format!("{marker}{label}"), *content))
        .collect();

    ResponseEnvelope::showcase(topics, prompt.system_prompt())
        .with_context_note(ResponseEnvelope::context_note_for(request.tags()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_primitives::{EnvelopeKind, reserved_keys};

    #[test]
    fn carries_marker_and_three_topics() {
        let request = GenerationRequest::new("Write posts").with_tags(["jina"]);
        let prompt = PromptDocument::new("system", "[]");

        let envelope = showcase_envelope(&request, &prompt, "🧠 ");
        assert_eq!(envelope.kind(), EnvelopeKind::Showcase);
        assert_eq!(envelope.topics().len(), 3);
        assert!(envelope.topics().contains_key("🧠 Product launch"));
        assert_eq!(envelope.prompt_echo(), "system");
        assert!(envelope.input_echo().is_none());

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json[reserved_keys::SHOWCASE_STATUS],
            reserved_keys::SHOWCASE_DETAIL
        );
        assert_eq!(json[reserved_keys::CONTEXT], "Including context jina");
    }
}
