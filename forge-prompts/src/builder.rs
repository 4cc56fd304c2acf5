//! Composition of the initial prompt for a generation request.

use forge_primitives::GenerationRequest;
use tracing::debug;

use crate::{ContextStore, PromptDocument, PromptResult, PromptTemplate};

/// Phrase placed in front of every injected context snippet.
pub const CONTEXT_LEAD_IN: &str =
    "Please use these information as additional context when creating content: ";

/// Output-format contract appended to every instruction.
///
/// `{{min_topics}}` is replaced with the configured minimum item count.
pub const DEFAULT_FORMAT_CONTRACT: &str = r#"
Return your output in this specific JSON format: {"<TOPIC1>":"<NEWCONTENT1>", "<TOPIC2>":"<NEWCONTENT2>"} , where <TOPIC> is the topic of the generated <CONTENT>.
Make sure that the TOPIC does not contain any characters that might break the JSON. Generate at least {{min_topics}} new different content snippets.
"#;

const MIN_TOPICS_VAR: &str = "min_topics";

/// Builds [`PromptDocument`]s from requests and context snippets.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    contract: PromptTemplate,
    min_topics: usize,
}

impl PromptBuilder {
    /// Creates a builder using the default contract.
    #[must_use]
    pub fn new(min_topics: usize) -> Self {
        Self {
            contract: PromptTemplate::new(DEFAULT_FORMAT_CONTRACT),
            min_topics,
        }
    }

    /// Replaces the contract template.
    #[must_use]
    pub fn with_contract(mut self, contract: PromptTemplate) -> Self {
        self.contract = contract;
        self
    }

    /// Returns the minimum number of items the contract demands.
    #[must_use]
    pub const fn min_topics(&self) -> usize {
        self.min_topics
    }

    /// Renders the contract with the configured minimum.
    ///
    /// # Errors
    ///
    /// Propagates template rendering failures.
    pub fn render_contract(&self) -> PromptResult<String> {
        Ok(self
            .contract
            .render_with_value(MIN_TOPICS_VAR, &self.min_topics.to_string())?)
    }

    /// Composes the initial prompt for `request`.
    ///
    /// Every tag is resolved before anything is composed, so an unknown tag
    /// never yields a partial prompt.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::UnknownContextTag`](crate::PromptError::UnknownContextTag)
    /// for the first tag missing from `store`.
    pub fn build(
        &self,
        store: &ContextStore,
        request: &GenerationRequest,
    ) -> PromptResult<PromptDocument> {
        let snippets = request
            .tags()
            .iter()
            .map(|tag| store.lookup_context(tag))
            .collect::<PromptResult<Vec<_>>>()?;

        let mut system_prompt = format!("{} \n {}", request.input_text(), self.render_contract()?);
        for snippet in snippets {
            system_prompt.push_str(CONTEXT_LEAD_IN);
            system_prompt.push_str(snippet);
        }

        let user_message = serde_json::to_string(&request.tweet_texts())?;

        debug!(
            tags = request.tags().len(),
            tweets = request.tweets().len(),
            prompt_len = system_prompt.len(),
            "composed prompt"
        );
        Ok(PromptDocument::new(system_prompt, user_message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PromptError, TextLibrary};
    use forge_primitives::Tweet;

    fn store() -> ContextStore {
        ContextStore::new(
            TextLibrary::from_entries([("a", "Alpha facts."), ("c", "Gamma facts.")]),
            TextLibrary::default(),
        )
    }

    #[test]
    fn composes_input_contract_and_context_in_order() {
        let request = GenerationRequest::new("Write posts")
            .with_tags(["c", "a"])
            .with_tweets(vec![Tweet::new("1", "u", "first"), Tweet::new("2", "u", "second")]);

        let doc = PromptBuilder::new(5).build(&store(), &request).unwrap();
        let system = doc.system_prompt();

        assert!(system.starts_with("Write posts \n \nReturn your output"));
        assert!(system.contains("Generate at least 5 new different content snippets."));
        let gamma = system.find("Gamma facts.").unwrap();
        let alpha = system.find("Alpha facts.").unwrap();
        assert!(gamma < alpha);
        assert_eq!(system.matches(CONTEXT_LEAD_IN).count(), 2);
        assert_eq!(doc.user_message(), r#"["first","second"]"#);
    }

    #[test]
    fn unknown_tag_fails_even_after_a_known_one() {
        let request = GenerationRequest::new("x").with_tags(["a", "b"]);
        let err = PromptBuilder::new(5)
            .build(&store(), &request)
            .expect_err("b is unknown");
        assert!(matches!(err, PromptError::UnknownContextTag { ref tag } if tag == "b"));
    }

    #[test]
    fn no_tags_means_no_lead_in() {
        let doc = PromptBuilder::new(3)
            .build(&store(), &GenerationRequest::new("x"))
            .unwrap();
        assert!(!doc.system_prompt().contains(CONTEXT_LEAD_IN));
        assert_eq!(doc.user_message(), "[]");
    }

    #[test]
    fn custom_contract_receives_minimum() {
        let builder = PromptBuilder::new(10)
            .with_contract(PromptTemplate::new("need {{min_topics}} items"));
        assert_eq!(builder.render_contract().unwrap(), "need 10 items");
    }
}
