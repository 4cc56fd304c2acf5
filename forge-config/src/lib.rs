//! Service configuration.
//!
//! Resolution order, highest priority first:
//! 1. Environment variables (`FORGE_BIND`, `FORGE_MODEL`)
//! 2. The TOML file, when one is given
//! 3. Compiled defaults
//!
//! CLI flags are applied by the binary on top of the result.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod schema;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

pub use error::{ConfigError, ConfigResult};
pub use forge_telemetry::{LogFormat, TelemetryConfig};
pub use schema::{DataConfig, GenerationConfig, OpenAiSection, ServerConfig};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "FORGE_CONFIG";
/// Environment override for [`ServerConfig::bind`].
pub const BIND_ENV: &str = "FORGE_BIND";
/// Environment override for [`OpenAiSection::model`].
pub const MODEL_ENV: &str = "FORGE_MODEL";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Files and directories.
    pub data: DataConfig,
    /// Pipeline behaviour.
    pub generation: GenerationConfig,
    /// Model provider.
    pub openai: OpenAiSection,
    /// Logging.
    pub telemetry: TelemetryConfig,
}

impl ForgeConfig {
    /// Loads the file at `path` (or defaults), applies process environment
    /// overrides, and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or a
    /// value fails validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`ForgeConfig::load`], reading overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ForgeConfig::load`].
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                let config = Self::parse(&content, &path)?;
                info!(path = %path.display(), "configuration loaded");
                config
            }
            None => Self::default(),
        };

        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without env overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown keys.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Self::parse(content, Path::new("<string>"))
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(bind) = non_empty(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.openai.model = model;
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.bind_addr()?;
        if self.generation.min_topics == 0 {
            return Err(ConfigError::invalid(
                "generation.min_topics",
                "must be greater than 0",
            ));
        }
        if self.openai.model.trim().is_empty() {
            return Err(ConfigError::invalid("openai.model", "must not be empty"));
        }
        if self.openai.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "openai.timeout_secs",
                "must be greater than 0",
            ));
        }
        let base_url = self.openai.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "openai.base_url",
                "must start with http:// or https://",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_valid() {
        let config = ForgeConfig::load_with_env(None, no_env).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.generation.min_topics, 5);
        assert_eq!(config.generation.topic_marker, "🧠 ");
        assert_eq!(config.openai.model, "gpt-4");
        assert_eq!(config.data.cache_path, PathBuf::from("cache.json"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = ForgeConfig::from_toml(
            r#"
            [generation]
            min_topics = 10
            cache_results = false

            [telemetry]
            format = "pretty"
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.min_topics, 10);
        assert!(!config.generation.cache_results);
        assert!(config.generation.persist_results);
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
        assert_eq!(config.openai.timeout_secs, 60);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ForgeConfig::from_toml("[openai]\napi_key = \"sk\"").expect_err("unknown");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let path = std::env::temp_dir().join(format!("forge-config-{}.toml", Uuid::new_v4()));
        std::fs::write(&path, "[openai]\nmodel = \"gpt-3.5-turbo\"\n").unwrap();
        let env: HashMap<&str, &str> = [(MODEL_ENV, "gpt-4o"), (BIND_ENV, "127.0.0.1:9000")].into();

        let config = ForgeConfig::load_with_env(Some(&path), |key| {
            env.get(key).map(|value| (*value).to_owned())
        })
        .unwrap();

        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.server.bind_addr().unwrap().port(), 9000);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn config_path_can_come_from_env() {
        let path = std::env::temp_dir().join(format!("forge-config-{}.toml", Uuid::new_v4()));
        std::fs::write(&path, "[generation]\nmin_topics = 7\n").unwrap();
        let display = path.display().to_string();

        let config = ForgeConfig::load_with_env(None, |key| {
            (key == CONFIG_PATH_ENV).then(|| display.clone())
        })
        .unwrap();
        assert_eq!(config.generation.min_topics, 7);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join(format!("forge-missing-{}.toml", Uuid::new_v4()));
        let err = ForgeConfig::load_with_env(Some(&path), no_env).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut config = ForgeConfig::default();
        config.generation.min_topics = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "generation.min_topics", .. })
        ));

        let mut config = ForgeConfig::default();
        config.openai.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ForgeConfig::default();
        config.openai.base_url = "api.openai.com".to_owned();
        assert!(config.validate().is_err());

        let mut config = ForgeConfig::default();
        config.server.bind = "not an address".to_owned();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "server.bind", .. })
        ));
    }
}
