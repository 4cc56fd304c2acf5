//! State shared by every request handler.
//!
//! The post list is the only mutable part; `/refresh` swaps it under a write
//! lock while readers keep serving the previous list.

use std::path::PathBuf;
use std::sync::Arc;

use forge_kernel::GenerationOrchestrator;
use forge_memory::{Dataset, ResultCache, StoreResult};
use forge_primitives::Tweet;
use tokio::sync::RwLock;
use tracing::info;

/// Files the post list is read from.
#[derive(Clone, Debug)]
pub struct DatasetSource {
    /// Scraped dataset.
    pub primary: PathBuf,
    /// Bundled dataset used when the scraped one is missing.
    pub fallback: PathBuf,
}

impl DatasetSource {
    /// Reads the dataset from disk.
    ///
    /// # Errors
    ///
    /// See [`Dataset::load`].
    pub async fn load(&self) -> StoreResult<Dataset> {
        Dataset::load(&self.primary, &self.fallback).await
    }
}

/// State shared by every request.
#[derive(Debug)]
pub struct AppState {
    orchestrator: GenerationOrchestrator,
    cache: Arc<ResultCache>,
    tweets: RwLock<Vec<Tweet>>,
    dataset: DatasetSource,
}

impl AppState {
    /// Assembles the state from already loaded parts.
    #[must_use]
    pub fn new(
        orchestrator: GenerationOrchestrator,
        cache: Arc<ResultCache>,
        dataset: Dataset,
        source: DatasetSource,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            tweets: RwLock::new(dataset.into_tweets()),
            dataset: source,
        }
    }

    /// Returns the generation pipeline.
    #[must_use]
    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    /// Returns the result cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Returns a copy of the current post list.
    pub async fn tweets(&self) -> Vec<Tweet> {
        self.tweets.read().await.clone()
    }

    /// Returns the number of loaded posts.
    pub async fn tweet_count(&self) -> usize {
        self.tweets.read().await.len()
    }

    /// Reloads the post list from disk and returns the new list.
    ///
    /// The previous list stays in place when loading fails.
    ///
    /// # Errors
    ///
    /// See [`Dataset::load`].
    pub async fn refresh(&self) -> StoreResult<Vec<Tweet>> {
        let tweets = self.dataset.load().await?.into_tweets();
        info!(count = tweets.len(), "dataset refreshed");
        *self.tweets.write().await = tweets.clone();
        Ok(tweets)
    }
}
