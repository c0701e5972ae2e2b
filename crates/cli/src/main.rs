use anyhow::{Context, Result};
use clap::Parser;
use extract::{AgentClient, CachedExtractor, ExtractionGateway, LlmExtractor, OllamaClient};
use interactions::InteractionService;
use remote::{MemoryStore, RemoteStore, RestStore};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{Cli, Commands};
use config::{AppConfig, ExtractionMode, LoggingConfig, StoreBackend};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.dry_run {
        AppConfig::dry_run().overlay(|key| std::env::var(key).ok())?
    } else {
        AppConfig::from_env()?
    };
    init_tracing(&config.logging);

    let service = build_service(&config)?;

    let outcome = match cli.command {
        Commands::List => commands::list(&service).await,
        Commands::Log(args) => commands::log(&service, args).await,
        Commands::Chat(args) => commands::chat(&service, args).await,
        Commands::Delete { id } => commands::delete(&service, id).await,
        Commands::Edit(args) => commands::edit(&service, args).await,
    };

    if cli.stats {
        output::stats(&service.metrics());
    }
    outcome
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries command output
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_service(config: &AppConfig) -> Result<InteractionService> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let store: Arc<dyn RemoteStore> = match config.store.backend {
        StoreBackend::Rest => Arc::new(RestStore::with_client(config.api.base_url.clone(), client.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let extractor: Arc<dyn ExtractionGateway> = match config.extraction.mode {
        ExtractionMode::Remote => Arc::new(AgentClient::with_client(config.api.base_url.clone(), client)),
        ExtractionMode::Local => {
            let llm = OllamaClient::new(config.llm.base_url.clone(), config.llm.model.clone());
            Arc::new(LlmExtractor::new(llm, config.llm.max_json_attempts))
        }
    };

    let extractor: Arc<dyn ExtractionGateway> = if config.cache.enabled {
        Arc::new(CachedExtractor::new(extractor, config.cache.max_entries))
    } else {
        extractor
    };

    tracing::debug!(
        store = ?config.store.backend,
        extraction = ?config.extraction.mode,
        cache = config.cache.enabled,
        "Gateways configured"
    );

    Ok(InteractionService::with_history_limit(
        store,
        extractor,
        config.store.history_limit,
    ))
}
