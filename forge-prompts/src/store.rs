//! Read-only lookup tables of named text snippets.
//!
//! Both context snippets and prompt templates live in flat directories with
//! one `.txt` file per entry; the file stem is the key. Tables are loaded
//! once at startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{PromptError, PromptResult};

const SNIPPET_EXTENSION: &str = "txt";

/// A named collection of text snippets keyed by file stem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextLibrary {
    entries: BTreeMap<String, String>,
}

impl TextLibrary {
    /// Loads every `.txt` file in `dir`.
    ///
    /// A missing directory yields an empty library and a warning; `kind`
    /// only labels the log lines.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Io`] when the directory exists but a file in it
    /// cannot be read.
    pub async fn load_dir(kind: &str, dir: impl AsRef<Path>) -> PromptResult<Self> {
        let dir = dir.as_ref();
        let mut reader = match fs::read_dir(dir).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(kind, path = %dir.display(), "snippet directory does not exist");
                return Ok(Self::default());
            }
            Err(err) => return Err(PromptError::io(dir, err)),
        };

        let mut entries = BTreeMap::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| PromptError::io(dir, err))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map_err(|err| PromptError::io(&path, err))?
                .is_file();
            let has_extension = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(SNIPPET_EXTENSION));
            let is_snippet = is_file && has_extension;
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if !is_snippet {
                debug!(kind, path = %path.display(), "skipping non-snippet entry");
                continue;
            }

            let body = fs::read_to_string(&path)
                .await
                .map_err(|err| PromptError::io(&path, err))?;
            entries.insert(stem.to_owned(), body);
        }

        info!(kind, count = entries.len(), path = %dir.display(), "imported snippets");
        Ok(Self { entries })
    }

    /// Builds a library from in-memory pairs.
    #[must_use]
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, body)| (key.into(), body.into()))
                .collect(),
        }
    }

    /// Returns the snippet stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the number of snippets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, body)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, body)| (key.as_str(), body.as_str()))
    }
}

/// Context snippets and prompt templates available to the pipeline.
#[derive(Clone, Debug, Default)]
pub struct ContextStore {
    contexts: TextLibrary,
    prompts: TextLibrary,
}

impl ContextStore {
    /// Creates a store from already loaded libraries.
    #[must_use]
    pub fn new(contexts: TextLibrary, prompts: TextLibrary) -> Self {
        Self { contexts, prompts }
    }

    /// Loads both libraries from their directories.
    ///
    /// # Errors
    ///
    /// Propagates [`PromptError::Io`] from [`TextLibrary::load_dir`].
    pub async fn load(
        contexts_dir: impl AsRef<Path>,
        prompts_dir: impl AsRef<Path>,
    ) -> PromptResult<Self> {
        let contexts = TextLibrary::load_dir("contexts", contexts_dir).await?;
        let prompts = TextLibrary::load_dir("prompts", prompts_dir).await?;
        Ok(Self::new(contexts, prompts))
    }

    /// Resolves a context tag to its snippet body.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::UnknownContextTag`] when no snippet has that tag.
    pub fn lookup_context(&self, tag: &str) -> PromptResult<&str> {
        self.contexts
            .get(tag)
            .ok_or_else(|| PromptError::unknown_tag(tag))
    }

    /// Returns every context snippet.
    #[must_use]
    pub fn contexts(&self) -> &TextLibrary {
        &self.contexts
    }

    /// Returns every named prompt template.
    #[must_use]
    pub fn prompts(&self) -> &TextLibrary {
        &self.prompts
    }
}
