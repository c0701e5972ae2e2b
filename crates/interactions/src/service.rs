use extract::ExtractionGateway;
use record::{parse_raw_document, render_raw_document, Draft, ExtractionResult, InteractionPayload, InteractionRecord, RecordId};
use remote::RemoteStore;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::InteractionError;
use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};
use crate::reconcile::{merge_extraction, overrides_from, to_persisted, Overrides};
use crate::state::{CurrentExtraction, InteractionState, StoreEvent, DEFAULT_HISTORY_LIMIT};
use crate::status::{OperationId, OperationKind, Status};

struct Pending {
    op: OperationId,
    kind: OperationKind,
    timer: TimedOperation,
}

/// Dispatches user intents against the gateways and feeds every outcome
/// back into the shared [`InteractionState`].
///
/// Gateway calls run without holding the state lock, so intents overlap
/// freely; each resolved outcome is a single write.
#[derive(Clone)]
pub struct InteractionService {
    store: Arc<dyn RemoteStore>,
    extractor: Arc<dyn ExtractionGateway>,
    state: Arc<RwLock<InteractionState>>,
    metrics: Arc<Metrics>,
}

impl InteractionService {
    pub fn new(store: Arc<dyn RemoteStore>, extractor: Arc<dyn ExtractionGateway>) -> Self {
        Self::with_history_limit(store, extractor, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(
        store: Arc<dyn RemoteStore>,
        extractor: Arc<dyn ExtractionGateway>,
        history_limit: usize,
    ) -> Self {
        Self {
            store,
            extractor,
            state: Arc::new(RwLock::new(InteractionState::new(history_limit))),
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<InteractionRecord>, InteractionError> {
        let pending = self.begin(OperationKind::Fetch).await;
        match self.store.list().await {
            Ok(records) => {
                let op = pending.op;
                self.succeed(pending, StoreEvent::Fetched { op, records: records.clone() })
                    .await;
                Ok(records)
            }
            Err(e) => Err(self.fail(pending, e.into()).await),
        }
    }

    /// Persist a form draft. The draft is reset once the store confirms.
    pub async fn save_draft(&self, draft: &mut Draft) -> Result<InteractionRecord, InteractionError> {
        let payload = to_persisted(draft, "", &Overrides::default());
        let record = self.create(payload).await?;
        draft.reset();
        Ok(record)
    }

    /// Submit free text for extraction. A result is only shown if no newer
    /// extraction was requested (or dismissed) while this one was in flight.
    pub async fn request_extraction(&self, raw_text: &str) -> Result<ExtractionResult, InteractionError> {
        let pending = self.begin(OperationKind::Extract).await;
        match self.extractor.extract(raw_text).await {
            Ok(result) => {
                let op = pending.op;
                let event = StoreEvent::Extracted {
                    op,
                    source_text: raw_text.to_string(),
                    result: result.clone(),
                };
                self.succeed(pending, event).await;
                Ok(result)
            }
            Err(e) => Err(self.fail(pending, e.into()).await),
        }
    }

    pub async fn dismiss_extraction(&self) {
        self.state.write().await.apply(StoreEvent::ExtractionDismissed);
        tracing::debug!("Extraction dismissed");
    }

    /// Merge the extraction on display into `draft` and persist it, using
    /// the text that was submitted for extraction as `raw_text`.
    pub async fn save_extracted(&self, draft: &mut Draft) -> Result<InteractionRecord, InteractionError> {
        let current = self.state.read().await.extraction().cloned();
        let current = current.ok_or(InteractionError::NoExtraction)?;

        merge_extraction(draft, &current.result);
        let payload = to_persisted(draft, &current.source_text, &overrides_from(&current.result));
        let record = self.create(payload).await?;

        {
            let mut state = self.state.write().await;
            if state.extraction().map(|e| e.op) == Some(current.op) {
                state.apply(StoreEvent::ExtractionDismissed);
            }
        }
        draft.reset();
        Ok(record)
    }

    /// Render the draft into a template, extract from it, merge the result
    /// back and create a record from the merged draft. The merged draft is
    /// left in place for further editing.
    pub async fn save_and_summarize(&self, draft: &mut Draft) -> Result<InteractionRecord, InteractionError> {
        let source_text = draft.to_source_text();
        let result = self.request_extraction(&source_text).await?;

        merge_extraction(draft, &result);
        let payload = to_persisted(draft, &source_text, &overrides_from(&result));
        self.create(payload).await
    }

    /// The record is removed from the list only after the store confirms.
    pub async fn delete(&self, id: RecordId) -> Result<(), InteractionError> {
        let pending = self.begin(OperationKind::Delete).await;
        match self.store.delete(id).await {
            Ok(()) => {
                let op = pending.op;
                self.succeed(pending, StoreEvent::Deleted { op, id }).await;
                Ok(())
            }
            Err(e) => Err(self.fail(pending, e.into()).await),
        }
    }

    /// Pretty JSON for a listed record, for editing by hand.
    pub async fn raw_document(&self, id: RecordId) -> Result<String, InteractionError> {
        let state = self.state.read().await;
        let record = state.record(id).ok_or(InteractionError::UnknownRecord(id))?;
        render_raw_document(record).map_err(InteractionError::Render)
    }

    /// Submit an edited raw document. A document that does not parse or
    /// validate is rejected before any operation is started.
    pub async fn edit(&self, id: RecordId, text: &str) -> Result<InteractionRecord, InteractionError> {
        let record = parse_raw_document(text, id)?;

        let pending = self.begin(OperationKind::Update).await;
        match self.store.update(id, &record).await {
            Ok(updated) => {
                let op = pending.op;
                self.succeed(pending, StoreEvent::Updated { op, record: updated.clone() })
                    .await;
                Ok(updated)
            }
            Err(e) => Err(self.fail(pending, e.into()).await),
        }
    }

    pub async fn snapshot(&self) -> InteractionState {
        self.state.read().await.clone()
    }

    pub async fn list(&self) -> Vec<InteractionRecord> {
        self.state.read().await.list().to_vec()
    }

    pub async fn extraction(&self) -> Option<CurrentExtraction> {
        self.state.read().await.extraction().cloned()
    }

    pub async fn status(&self) -> Status {
        self.state.read().await.status()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error().map(str::to_string)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn create(&self, payload: InteractionPayload) -> Result<InteractionRecord, InteractionError> {
        let pending = self.begin(OperationKind::Create).await;
        match self.store.create(&payload).await {
            Ok(record) => {
                let op = pending.op;
                self.succeed(pending, StoreEvent::Created { op, record: record.clone() })
                    .await;
                Ok(record)
            }
            Err(e) => Err(self.fail(pending, e.into()).await),
        }
    }

    async fn begin(&self, kind: OperationKind) -> Pending {
        let op = OperationId::new();
        self.state.write().await.apply(StoreEvent::Started { op, kind });
        self.metrics.record_dispatch(kind);
        tracing::debug!(operation = %kind, op = %op, "Dispatching");

        Pending {
            op,
            kind,
            timer: TimedOperation::start(),
        }
    }

    async fn succeed(&self, pending: Pending, event: StoreEvent) {
        self.state.write().await.apply(event);
        let elapsed = pending.timer.elapsed();
        self.metrics.record_outcome(pending.kind, true, elapsed);
        tracing::info!(
            operation = %pending.kind,
            op = %pending.op,
            elapsed_ms = elapsed.as_millis() as u64,
            "Operation succeeded"
        );
    }

    async fn fail(&self, pending: Pending, err: InteractionError) -> InteractionError {
        self.state.write().await.apply(StoreEvent::Failed {
            op: pending.op,
            message: err.to_string(),
        });
        self.metrics.record_outcome(pending.kind, false, pending.timer.elapsed());
        tracing::warn!(operation = %pending.kind, op = %pending.op, error = %err, "Operation failed");
        err
    }
}
