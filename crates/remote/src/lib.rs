pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use async_trait::async_trait;
use record::{InteractionPayload, InteractionRecord, RecordId};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{method} {path} returned {status}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },
    #[error("interaction {0} not found")]
    NotFound(RecordId),
}

/// CRUD against whatever persists interactions.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<InteractionRecord>, TransportError>;

    /// The store assigns `id` and `created_at`.
    async fn create(&self, payload: &InteractionPayload) -> Result<InteractionRecord, TransportError>;

    async fn update(&self, id: RecordId, record: &InteractionRecord) -> Result<InteractionRecord, TransportError>;

    async fn delete(&self, id: RecordId) -> Result<(), TransportError>;
}
