use async_trait::async_trait;
use record::ExtractionResult;
use serde::Serialize;
use serde_json::Value;

use crate::{ExtractError, ExtractionGateway, ExtractionServiceError};

/// Client for a hosted `POST /agent/log` endpoint.
#[derive(Clone)]
pub struct AgentClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct AgentLogRequest<'a> {
    text: &'a str,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl ExtractionGateway for AgentClient {
    async fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractError> {
        let url = format!("{}/agent/log", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AgentLogRequest { text: raw_text })
            .send()
            .await
            .map_err(ExtractionServiceError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionServiceError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        // Anything that is not JSON at all is the service's fault; JSON of
        // the wrong shape is reported separately.
        let value: Value = response.json().await.map_err(ExtractionServiceError::from)?;
        Ok(ExtractionResult::from_value(value)?)
    }
}
