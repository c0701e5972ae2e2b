#![allow(dead_code)]

use async_trait::async_trait;
use extract::{ExtractError, ExtractionGateway, ExtractionServiceError};
use interactions::InteractionService;
use record::{Draft, ExtractionResult, InteractionPayload, InteractionRecord, RecordId};
use remote::{MemoryStore, RemoteStore, TransportError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-process store whose next `list` can be held back until released,
/// and whose deletes can be made to fail.
#[derive(Default)]
pub struct GatedStore {
    pub inner: MemoryStore,
    list_gate: Mutex<Option<Arc<Notify>>>,
    list_calls: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl GatedStore {
    /// The next `list` reads the store immediately but does not return
    /// until the returned gate is notified.
    pub fn gate_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Create records directly in the backing store, bypassing the service.
    pub async fn seed(&self, names: &[&str]) {
        for name in names {
            let draft = Draft {
                hcp_name: name.to_string(),
                ..Draft::default()
            };
            self.inner.create(&draft.to_payload("")).await.unwrap();
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteStore for GatedStore {
    async fn list(&self) -> Result<Vec<InteractionRecord>, TransportError> {
        let snapshot = self.inner.list().await?;
        let gate = self.list_gate.lock().unwrap().take();
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(snapshot)
    }

    async fn create(&self, payload: &InteractionPayload) -> Result<InteractionRecord, TransportError> {
        self.inner.create(payload).await
    }

    async fn update(&self, id: RecordId, record: &InteractionRecord) -> Result<InteractionRecord, TransportError> {
        self.inner.update(id, record).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), TransportError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(TransportError::Status {
                method: "DELETE",
                path: format!("/interactions/{id}"),
                status: 500,
                body: "database unavailable".to_string(),
            });
        }
        self.inner.delete(id).await
    }
}

enum Reply {
    Value(Value),
    Fail(String),
}

/// Extraction gateway answering from a script keyed by submitted text.
#[derive(Default)]
pub struct ScriptedExtractor {
    replies: Mutex<HashMap<String, Reply>>,
    fallback: Mutex<Option<Value>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn reply(&self, text: &str, value: Value) {
        self.replies.lock().unwrap().insert(text.to_string(), Reply::Value(value));
    }

    pub fn fail(&self, text: &str, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(text.to_string(), Reply::Fail(message.to_string()));
    }

    /// Reply for any text without a scripted answer.
    pub fn reply_to_anything(&self, value: Value) {
        *self.fallback.lock().unwrap() = Some(value);
    }

    pub fn gate(&self, text: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(text.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionGateway for ScriptedExtractor {
    async fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(raw_text).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let value = match self.replies.lock().unwrap().get(raw_text) {
            Some(Reply::Value(value)) => Some(value.clone()),
            Some(Reply::Fail(message)) => {
                return Err(ExtractionServiceError::Model(message.clone()).into());
            }
            None => None,
        };
        let value = value
            .or_else(|| self.fallback.lock().unwrap().clone())
            .ok_or_else(|| ExtractionServiceError::Model(format!("no scripted reply for {raw_text:?}")))?;

        Ok(ExtractionResult::from_value(value)?)
    }
}

pub struct Harness {
    pub service: InteractionService,
    pub store: Arc<GatedStore>,
    pub extractor: Arc<ScriptedExtractor>,
}

pub fn harness() -> Harness {
    let store = Arc::new(GatedStore::default());
    let extractor = Arc::new(ScriptedExtractor::default());
    let service = InteractionService::new(store.clone(), extractor.clone());
    Harness {
        service,
        store,
        extractor,
    }
}

/// Wait until `done` holds, yielding to spawned tasks in between.
pub async fn until(mut done: impl FnMut() -> bool) {
    while !done() {
        tokio::task::yield_now().await;
    }
}
