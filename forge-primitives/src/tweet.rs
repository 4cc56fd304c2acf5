//! Source posts selected by callers and listed by the dataset loader.

use serde::{Deserialize, Serialize};

/// Length of the `YYYY-MM-DD` prefix kept from dataset timestamps.
const DATE_PREFIX_LEN: usize = 10;

/// A single ingested post.
///
/// Serialises in the API form (`tweet`, `likes`, `profileImage`) and accepts
/// the dataset form (`text`, `likeCount`, `profileImageURL`) on input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    id: String,
    #[serde(default)]
    user: String,
    #[serde(rename = "tweet", alias = "text")]
    text: String,
    #[serde(rename = "likes", alias = "likeCount", default)]
    like_count: u64,
    #[serde(default)]
    date: String,
    #[serde(rename = "profileImage", alias = "profileImageURL", default)]
    profile_image_url: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "userTags", default)]
    user_tags: Vec<String>,
}

impl Tweet {
    /// Creates a post with the mandatory fields; the rest start empty.
    #[must_use]
    pub fn new(id: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            text: text.into(),
            like_count: 0,
            date: String::new(),
            profile_image_url: String::new(),
            url: String::new(),
            user_tags: Vec::new(),
        }
    }

    /// Sets the like count.
    #[must_use]
    pub fn with_like_count(mut self, like_count: u64) -> Self {
        self.like_count = like_count;
        self
    }

    /// Sets the publication date.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the author-level tags.
    #[must_use]
    pub fn with_user_tags(mut self, tags: Vec<String>) -> Self {
        self.user_tags = tags;
        self
    }

    /// Trims the body and cuts the date down to its day component.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let trimmed = self.text.trim();
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_owned();
        }
        if let Some((idx, _)) = self.date.char_indices().nth(DATE_PREFIX_LEN) {
            self.date.truncate(idx);
        }
        self
    }

    /// Returns the post identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the author handle.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the post body.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the like count.
    #[must_use]
    pub const fn like_count(&self) -> u64 {
        self.like_count
    }

    /// Returns the publication date.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Returns the author's profile image URL.
    #[must_use]
    pub fn profile_image_url(&self) -> &str {
        &self.profile_image_url
    }

    /// Returns the permalink of the post.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the author-level tags.
    #[must_use]
    pub fn user_tags(&self) -> &[String] {
        &self.user_tags
    }
}
