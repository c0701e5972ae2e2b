use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompt;

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>, // "json" for structured output
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Free-form completion.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.send(prompt, None).await
    }

    async fn send(&self, prompt: &str, format: Option<&str>) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format: format.map(str::to_string),
        };

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            anyhow::bail!("Ollama request failed: {}", response.status());
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(ollama_response.response)
    }

    /// Generate a JSON object, asking the model to repair invalid output.
    pub async fn generate_json_with_retry(
        &self,
        prompt: &str,
        max_attempts: usize,
    ) -> Result<Value> {
        let mut response = self.send(prompt, Some("json")).await?;

        for attempt in 1..=max_attempts {
            if let Some(value) = extract_json_object(&response)? {
                return Ok(value);
            }

            if attempt == max_attempts {
                break;
            }

            tracing::warn!(
                model = %self.model,
                attempt = attempt,
                max_attempts = max_attempts,
                "Model returned invalid JSON, asking it to repair"
            );
            response = self.send(&prompt::build_retry_prompt(&response), Some("json")).await?;
        }

        anyhow::bail!("Failed to get valid JSON after {} attempts", max_attempts)
    }
}

/// Parse a JSON object, tolerating prose or code fences around it.
pub fn extract_json_object(raw: &str) -> Result<Option<Value>> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw.trim()) {
        return Ok(Some(value));
    }

    let re = Regex::new(r"(?s)\{.*\}")?;
    Ok(re
        .find(raw)
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .filter(Value::is_object))
}

/// Parse a list of suggestions: a JSON array when the model complies,
/// otherwise one suggestion per non-empty line with bullets or numbering removed.
pub fn parse_suggestions(raw: &str) -> Result<Vec<String>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw.trim()) {
        return Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect());
    }

    let bullet = Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*")?;
    Ok(raw
        .lines()
        .map(|line| bullet.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}
