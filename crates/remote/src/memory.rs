use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use record::{InteractionPayload, InteractionRecord, RecordId};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::{RemoteStore, TransportError};

/// In-process `RemoteStore` for dry runs and tests. Lists newest first,
/// the way the REST backend orders by descending id.
pub struct MemoryStore {
    records: DashMap<RecordId, InteractionRecord>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<InteractionRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list(&self) -> Result<Vec<InteractionRecord>, TransportError> {
        let mut records: Vec<InteractionRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(records)
    }

    async fn create(&self, payload: &InteractionPayload) -> Result<InteractionRecord, TransportError> {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = InteractionRecord::from_payload(id, payload.clone(), Utc::now());
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: RecordId, record: &InteractionRecord) -> Result<InteractionRecord, TransportError> {
        let mut entry = self.records.get_mut(&id).ok_or(TransportError::NotFound(id))?;
        let created_at = entry.created_at;
        *entry = InteractionRecord {
            id,
            created_at,
            updated_at: Some(Utc::now()),
            ..record.clone()
        };
        Ok(entry.clone())
    }

    async fn delete(&self, id: RecordId) -> Result<(), TransportError> {
        self.records
            .remove(&id)
            .map(|_| ())
            .ok_or(TransportError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record::Draft;

    fn payload(name: &str) -> InteractionPayload {
        Draft {
            hcp_name: name.to_string(),
            ..Draft::default()
        }
        .to_payload("")
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let store = MemoryStore::new();
        let a = store.create(&payload("Dr. A")).await.unwrap();
        let b = store.create(&payload("Dr. B")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.created_at.is_some());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let mut edited = a.clone();
        edited.summary = "Edited".to_string();
        let updated = store.update(a.id, &edited).await.unwrap();
        assert_eq!(updated.summary, "Edited");
        assert_eq!(updated.created_at, a.created_at);

        store.delete(a.id).await.unwrap();
        assert!(matches!(store.delete(a.id).await, Err(TransportError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = MemoryStore::new();
        let a = store.create(&payload("Dr. A")).await.unwrap();
        let err = store.update(RecordId(99), &a).await.unwrap_err();
        assert!(matches!(err, TransportError::NotFound(RecordId(99))));
    }
}
