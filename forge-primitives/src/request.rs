//! Inbound generation request.

use serde::{Deserialize, Serialize};

use crate::Tweet;

/// Prompt identifier used when the caller does not name one.
const UNTITLED_PROMPT: &str = "untitled";

/// A caller's request to generate new content from selected posts.
///
/// Field names are camelCase on the wire; the original snake-case names
/// (`input_text`, `prompt`) are accepted as aliases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(alias = "input_text")]
    input_text: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(
        default,
        alias = "prompt",
        alias = "prompt_id",
        skip_serializing_if = "Option::is_none"
    )]
    prompt_id: Option<String>,
    #[serde(default)]
    tweets: Vec<Tweet>,
}

impl GenerationRequest {
    /// Creates a request with the supplied instruction text.
    #[must_use]
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            tags: Vec::new(),
            prompt_id: None,
            tweets: Vec::new(),
        }
    }

    /// Sets the context tags, in the order they should be injected.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the caller-supplied prompt identifier.
    #[must_use]
    pub fn with_prompt_id(mut self, prompt_id: impl Into<String>) -> Self {
        self.prompt_id = Some(prompt_id.into());
        self
    }

    /// Sets the selected posts.
    #[must_use]
    pub fn with_tweets(mut self, tweets: Vec<Tweet>) -> Self {
        self.tweets = tweets;
        self
    }

    /// Returns the instruction text.
    #[must_use]
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Returns the context tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the prompt identifier if one was supplied.
    #[must_use]
    pub fn prompt_id(&self) -> Option<&str> {
        self.prompt_id.as_deref()
    }

    /// Returns the prompt identifier, or `untitled` when absent or blank.
    #[must_use]
    pub fn prompt_label(&self) -> &str {
        self.prompt_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNTITLED_PROMPT)
    }

    /// Returns the selected posts.
    #[must_use]
    pub fn tweets(&self) -> &[Tweet] {
        &self.tweets
    }

    /// Returns the bodies of the selected posts in order.
    #[must_use]
    pub fn tweet_texts(&self) -> Vec<&str> {
        self.tweets.iter().map(Tweet::text).collect()
    }
}
