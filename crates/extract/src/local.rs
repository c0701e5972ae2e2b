use anyhow::{Context, Result};
use async_trait::async_trait;
use record::ExtractionResult;
use serde_json::{json, Value};

use crate::llm::{parse_suggestions, OllamaClient};
use crate::{prompt, ExtractError, ExtractionGateway, ExtractionServiceError};

const MAX_FOLLOWUPS: usize = 3;

/// Extraction pipeline that talks to a model directly instead of a hosted
/// `/agent/log` endpoint: entities, then a summary, then follow-up suggestions.
pub struct LlmExtractor {
    llm_client: OllamaClient,
    max_json_attempts: usize,
}

impl LlmExtractor {
    pub fn new(llm_client: OllamaClient, max_json_attempts: usize) -> Self {
        Self {
            llm_client,
            max_json_attempts: max_json_attempts.max(1),
        }
    }

    /// Structured entities for the note, as the model produced them.
    pub async fn extract_entities(&self, note: &str) -> Result<Value> {
        let prompt = prompt::build_extraction_prompt(note);
        self.llm_client
            .generate_json_with_retry(&prompt, self.max_json_attempts)
            .await
            .context("Failed to extract entities")
    }

    pub async fn summarize(&self, note: &str) -> Result<String> {
        let summary = self.llm_client
            .generate(&prompt::build_summary_prompt(note))
            .await
            .context("Failed to summarize interaction")?;
        Ok(summary.trim().to_string())
    }

    pub async fn suggest_followups(&self, entities: &Value) -> Result<Vec<String>> {
        let structured = serde_json::to_string_pretty(entities)?;
        let raw = self.llm_client
            .generate(&prompt::build_followup_prompt(&structured))
            .await
            .context("Failed to suggest follow-ups")?;

        let mut suggestions = parse_suggestions(&raw)?;
        suggestions.truncate(MAX_FOLLOWUPS);
        Ok(suggestions)
    }

    async fn run(&self, note: &str) -> Result<Value> {
        // Summary does not depend on the entities, so both go out together
        let (entities, summary) = tokio::try_join!(self.extract_entities(note), self.summarize(note))?;
        let followups = self.suggest_followups(&entities).await?;

        let sentiment = entities.get("sentiment").cloned().unwrap_or(Value::Null);
        Ok(json!({
            "interaction": {
                "structured_data": entities,
                "summary": summary,
                "sentiment": sentiment,
            },
            "followups": followups,
        }))
    }
}

#[async_trait]
impl ExtractionGateway for LlmExtractor {
    async fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractError> {
        let value = self.run(raw_text).await.map_err(|e| {
            tracing::warn!(model = %self.llm_client.model(), error = %e, "Local extraction failed");
            ExtractionServiceError::Model(format!("{e:#}"))
        })?;

        Ok(ExtractionResult::from_value(value)?)
    }
}
