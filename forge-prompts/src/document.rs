//! The two-part prompt sent to the model and its self-correction rewrite.

use serde::Serialize;

/// Appended to the system prompt each time the model's output failed to parse.
pub const SELF_CORRECTION_DIRECTIVE: &str =
    ". Your other job is to correct any given results if they dont match the output format";

/// System instruction plus user message for one attempt.
///
/// Only the self-correction protocol mutates a document, and only between
/// attempts of the same request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromptDocument {
    system_prompt: String,
    user_message: String,
    #[serde(skip)]
    corrections: usize,
}

impl PromptDocument {
    /// Creates a document from its two parts.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_message: user_message.into(),
            corrections: 0,
        }
    }

    /// Returns the system instruction.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Returns the user message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Returns how many self-corrections have been applied.
    #[must_use]
    pub const fn corrections(&self) -> usize {
        self.corrections
    }

    /// Rewrites the document so the model is asked to repair `raw_output`.
    ///
    /// The directive is appended to the system prompt and the user message is
    /// replaced by the parse failure and the previous output.
    pub fn apply_self_correction(&mut self, reason: &str, raw_output: &str) {
        self.system_prompt.push_str(SELF_CORRECTION_DIRECTIVE);
        self.user_message = correction_message(reason, raw_output);
        self.corrections += 1;
    }
}

fn correction_message(reason: &str, raw_output: &str) -> String {
    format!("JSON Parsing failed {reason} please correct your provided result {raw_output}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correction_embeds_reason_and_output() {
        let mut doc = PromptDocument::new("system", "[\"post\"]");
        doc.apply_self_correction("expected value at line 1", "{oops");

        assert!(doc.system_prompt().starts_with("system"));
        assert!(doc.system_prompt().ends_with(SELF_CORRECTION_DIRECTIVE));
        assert!(doc.user_message().contains("expected value at line 1"));
        assert!(doc.user_message().contains("{oops"));
        assert_eq!(doc.corrections(), 1);
    }

    #[test]
    fn repeated_corrections_never_repeat_a_prompt() {
        let first = PromptDocument::new("system", "input");
        let mut second = first.clone();
        second.apply_self_correction("bad", "same output");
        let mut third = second.clone();
        third.apply_self_correction("bad", "same output");

        assert_ne!(first, second);
        assert_ne!(second.system_prompt(), third.system_prompt());
        assert_eq!(third.corrections(), 2);
    }
}
