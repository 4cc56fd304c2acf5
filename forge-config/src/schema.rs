//! Typed sections of the configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// `[server]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_owned(),
        }
    }
}

impl ServerConfig {
    /// Parses [`ServerConfig::bind`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> ConfigResult<SocketAddr> {
        self.bind
            .parse()
            .map_err(|err| ConfigError::invalid("server.bind", format!("{}: {err}", self.bind)))
    }
}

/// `[data]` table: every file and directory the service touches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Scraped post list.
    pub dataset_path: PathBuf,
    /// Bundled post list used when the scraped one is missing.
    pub fallback_dataset_path: PathBuf,
    /// Directory of named prompt templates.
    pub prompts_dir: PathBuf,
    /// Directory of context snippets.
    pub contexts_dir: PathBuf,
    /// Where per-request records are written.
    pub results_dir: PathBuf,
    /// Result cache file.
    pub cache_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("./data_api/dataset.json"),
            fallback_dataset_path: PathBuf::from("./data_api/dummy_dataset.json"),
            prompts_dir: PathBuf::from("./data_api/prompts"),
            contexts_dir: PathBuf::from("./data_api/contexts"),
            results_dir: PathBuf::from("./data_api/outputs"),
            cache_path: PathBuf::from("cache.json"),
        }
    }
}

/// `[generation]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Minimum number of items the format contract asks for.
    pub min_topics: usize,
    /// Prefix added to every model-authored topic label.
    pub topic_marker: String,
    /// Store accepted envelopes in the result cache.
    pub cache_results: bool,
    /// Write one record file per request.
    pub persist_results: bool,
    /// Replacement for the built-in format contract; may use `{{min_topics}}`.
    pub format_contract: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_topics: 5,
            topic_marker: "🧠 ".to_owned(),
            cache_results: true,
            persist_results: true,
            format_contract: None,
        }
    }
}

/// `[openai]` table. The credential is never read from here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiSection {
    /// Chat model identifier.
    pub model: String,
    /// API root; `v1/chat/completions` is appended.
    pub base_url: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature; the provider default applies when unset.
    pub temperature: Option<f32>,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_owned(),
            base_url: "https://api.openai.com/".to_owned(),
            timeout_secs: 60,
            temperature: None,
        }
    }
}

impl OpenAiSection {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
