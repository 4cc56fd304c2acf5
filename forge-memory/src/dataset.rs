//! The list of source posts offered to callers.
//!
//! The primary file is produced by an external scraper. When it is absent a
//! bundled fallback file is used, and when that is absent too the list is
//! empty. A file that exists but does not parse is an error.

use std::io::ErrorKind;
use std::path::Path;

use forge_primitives::Tweet;
use tokio::fs;
use tracing::{info, warn};

use crate::{StoreError, StoreResult};

/// Normalized posts loaded from disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    tweets: Vec<Tweet>,
}

impl Dataset {
    /// Wraps already loaded posts, normalizing each one.
    #[must_use]
    pub fn new(tweets: Vec<Tweet>) -> Self {
        Self {
            tweets: tweets.into_iter().map(Tweet::normalized).collect(),
        }
    }

    /// Loads `primary`, falling back to `fallback`, then to an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a file exists but cannot be read or parsed.
    pub async fn load(primary: impl AsRef<Path>, fallback: impl AsRef<Path>) -> StoreResult<Self> {
        let primary = primary.as_ref();
        if let Some(tweets) = read_tweets(primary).await? {
            info!(count = tweets.len(), path = %primary.display(), "dataset loaded");
            return Ok(Self::new(tweets));
        }

        let fallback = fallback.as_ref();
        warn!(path = %primary.display(), "dataset not found, using fallback dataset");
        if let Some(tweets) = read_tweets(fallback).await? {
            info!(count = tweets.len(), path = %fallback.display(), "fallback dataset loaded");
            return Ok(Self::new(tweets));
        }

        warn!(path = %fallback.display(), "fallback dataset not found, serving an empty list");
        Ok(Self::default())
    }

    /// Returns the posts.
    #[must_use]
    pub fn tweets(&self) -> &[Tweet] {
        &self.tweets
    }

    /// Returns the number of posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    /// Returns `true` when no posts are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    /// Consumes the dataset and returns the posts.
    #[must_use]
    pub fn into_tweets(self) -> Vec<Tweet> {
        self.tweets
    }
}

async fn read_tweets(path: &Path) -> StoreResult<Option<Vec<Tweet>>> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::io(path, err)),
    };
    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|err| StoreError::serialization(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("forge-dataset-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const SCRAPED: &str = r#"[
        {"id": "1", "user": "ana", "text": "  shipped it \n", "likeCount": 4,
         "date": "2024-03-09T14:05:07.000Z", "profileImageURL": "p", "url": "u",
         "userTags": ["dev"]}
    ]"#;

    #[tokio::test]
    async fn primary_file_is_normalized() {
        let dir = temp_dir();
        std::fs::write(dir.join("dataset.json"), SCRAPED).unwrap();

        let dataset = Dataset::load(dir.join("dataset.json"), dir.join("dummy.json"))
            .await
            .unwrap();
        assert_eq!(dataset.len(), 1);
        let tweet = &dataset.tweets()[0];
        assert_eq!(tweet.text(), "shipped it");
        assert_eq!(tweet.date(), "2024-03-09");
        assert_eq!(tweet.like_count(), 4);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn falls_back_then_empties() {
        let dir = temp_dir();
        std::fs::write(dir.join("dummy.json"), SCRAPED).unwrap();

        let from_fallback = Dataset::load(dir.join("missing.json"), dir.join("dummy.json"))
            .await
            .unwrap();
        assert_eq!(from_fallback.len(), 1);

        let empty = Dataset::load(dir.join("missing.json"), dir.join("also-missing.json"))
            .await
            .unwrap();
        assert!(empty.is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn corrupt_primary_is_an_error() {
        let dir = temp_dir();
        std::fs::write(dir.join("dataset.json"), "[{").unwrap();

        let err = Dataset::load(dir.join("dataset.json"), dir.join("dummy.json"))
            .await
            .expect_err("corrupt");
        assert!(matches!(err, StoreError::Serialization { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }
}
