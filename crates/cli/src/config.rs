use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub extraction: ExtractionConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Remote, // POST /agent/log on the API
    Local,  // prompt the LLM directly
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Rest,
    Memory, // in-process, lost on exit
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub max_json_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Settled operations kept queryable.
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: bool,
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_secs: 30,
            },
            extraction: ExtractionConfig {
                mode: ExtractionMode::Remote,
            },
            llm: LlmConfig {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                max_json_attempts: 3,
            },
            cache: CacheConfig {
                enabled: true,
                max_entries: 256,
            },
            store: StoreConfig {
                backend: StoreBackend::Rest,
                history_limit: 16,
            },
            logging: LoggingConfig {
                json: false,
                filter: "info".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// No API server: records live in memory and extraction talks to the
    /// LLM directly.
    pub fn dry_run() -> Self {
        let mut config = Self::default();
        config.store.backend = StoreBackend::Memory;
        config.extraction.mode = ExtractionMode::Local;
        config
    }

    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply `HCP_*` overrides read through `lookup`.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("HCP_API_URL") {
            self.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("HCP_API_TIMEOUT_SECS") {
            self.api.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("HCP_API_TIMEOUT_SECS must be a whole number of seconds, got {secs:?}"))?;
        }
        if let Some(mode) = lookup("HCP_EXTRACTION_MODE") {
            self.extraction.mode = mode.parse()?;
        }
        if let Some(backend) = lookup("HCP_STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        if let Some(url) = lookup("HCP_LLM_URL") {
            self.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("HCP_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(flag) = lookup("HCP_CACHE") {
            self.cache.enabled = parse_flag("HCP_CACHE", &flag)?;
        }
        if let Some(flag) = lookup("HCP_LOG_JSON") {
            self.logging.json = parse_flag("HCP_LOG_JSON", &flag)?;
        }
        if let Some(filter) = lookup("HCP_LOG") {
            self.logging.filter = filter;
        }
        Ok(self)
    }
}

impl FromStr for ExtractionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" | "agent" => Ok(Self::Remote),
            "local" | "llm" => Ok(Self::Local),
            other => bail!("unknown extraction mode {other:?} (expected remote or local)"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown store backend {other:?} (expected rest or memory)"),
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}
