//! Builds [`AppState`] from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use forge_adapters::openai::{OPENAI_API_KEY_ENV, OpenAiClient, OpenAiConfig};
use forge_config::ForgeConfig;
use forge_kernel::GenerationOrchestrator;
use forge_memory::{ResultCache, ResultPersister};
use forge_prompts::{ContextStore, PromptBuilder, PromptTemplate};
use tracing::{info, warn};

use crate::{AppState, DatasetSource};

/// Loads snippets, dataset, and cache, and wires the orchestrator.
///
/// The model client is created only when `OPENAI_API_KEY` holds a value;
/// otherwise the service runs in showcase mode.
///
/// # Errors
///
/// Fails when a data directory or dataset file exists but cannot be read, the
/// format contract does not render, or the client cannot be configured.
pub async fn build_state(config: &ForgeConfig) -> Result<AppState> {
    let data = &config.data;
    let store = ContextStore::load(&data.contexts_dir, &data.prompts_dir)
        .await
        .context("loading context snippets and prompts")?;

    let source = DatasetSource {
        primary: data.dataset_path.clone(),
        fallback: data.fallback_dataset_path.clone(),
    };
    let dataset = source.load().await.context("loading dataset")?;
    let cache = Arc::new(ResultCache::load(&data.cache_path).await);

    let mut builder = PromptBuilder::new(config.generation.min_topics);
    if let Some(contract) = &config.generation.format_contract {
        let template = PromptTemplate::parse(contract.as_str())
            .context("parsing generation.format_contract")?;
        builder = builder.with_contract(template);
    }
    builder
        .render_contract()
        .context("rendering the format contract")?;

    let mut orchestrator = GenerationOrchestrator::new(Arc::new(store), builder)
        .with_topic_marker(config.generation.topic_marker.clone());
    if config.generation.cache_results {
        orchestrator = orchestrator.with_cache(cache.clone());
    }
    if config.generation.persist_results {
        orchestrator = orchestrator.with_persister(ResultPersister::new(&data.results_dir));
    }

    let mut openai = OpenAiConfig::from_env(config.openai.model.as_str())
        .with_base_url(&config.openai.base_url)
        .context("configuring the OpenAI base URL")?
        .with_timeout(config.openai.timeout());
    if let Some(temperature) = config.openai.temperature {
        openai = openai.with_default_temperature(temperature);
    }

    if openai.has_api_key() {
        info!(model = %config.openai.model, "model credential found");
        let client = OpenAiClient::new(openai).context("creating the OpenAI client")?;
        orchestrator = orchestrator.with_client(Arc::new(client));
    } else {
        warn!(
            variable = OPENAI_API_KEY_ENV,
            "no model credential set, running in showcase mode"
        );
    }

    Ok(AppState::new(orchestrator, cache, dataset, source))
}
