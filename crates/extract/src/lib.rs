pub mod agent;
pub mod cache;
pub mod llm;
pub mod local;
pub mod prompt;

pub use agent::AgentClient;
pub use cache::{CacheStats, CachedExtractor, ExtractionCache};
pub use llm::OllamaClient;
pub use local::LlmExtractor;

use async_trait::async_trait;
use record::{ExtractionResult, ExtractionShapeError};

/// The extraction service failed to produce a response.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionServiceError {
    #[error("extraction request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("extraction service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("extraction model failed: {0}")]
    Model(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Service(#[from] ExtractionServiceError),
    #[error(transparent)]
    Shape(#[from] ExtractionShapeError),
}

/// Turns free text into a structured interaction plus suggested follow-ups.
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    async fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractError>;
}
