use async_trait::async_trait;
use record::{InteractionPayload, InteractionRecord, RecordId};
use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::{RemoteStore, TransportError};

/// `RemoteStore` over the `/interactions` REST endpoints.
#[derive(Clone)]
pub struct RestStore {
    base_url: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(
    method: &'static str,
    path: String,
    id: Option<RecordId>,
    response: Response,
) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(TransportError::NotFound(id));
        }
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(method = method, path = %path, status = status.as_u16(), "Interaction store request failed");
    Err(TransportError::Status {
        method,
        path,
        status: status.as_u16(),
        body,
    })
}

// One unreadable row must not hide the rest of the list.
fn decode_records(items: Vec<Value>) -> Vec<InteractionRecord> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = item.get("id").cloned();
            match serde_json::from_value::<InteractionRecord>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(record_id = ?id, error = %e, "Skipping unreadable interaction");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn list(&self) -> Result<Vec<InteractionRecord>, TransportError> {
        let path = "/interactions".to_string();
        let response = self.client.get(self.url(&path)).send().await?;
        let response = check("GET", path, None, response).await?;
        let items: Vec<Value> = response.json().await?;
        Ok(decode_records(items))
    }

    async fn create(&self, payload: &InteractionPayload) -> Result<InteractionRecord, TransportError> {
        let path = "/interactions".to_string();
        let response = self.client.post(self.url(&path)).json(payload).send().await?;
        let response = check("POST", path, None, response).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: RecordId, record: &InteractionRecord) -> Result<InteractionRecord, TransportError> {
        let path = format!("/interactions/{id}");
        let response = self.client.put(self.url(&path)).json(record).send().await?;
        let response = check("PUT", path, Some(id), response).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: RecordId) -> Result<(), TransportError> {
        let path = format!("/interactions/{id}");
        let response = self.client.delete(self.url(&path)).send().await?;
        check("DELETE", path, Some(id), response).await?;
        Ok(())
    }
}
