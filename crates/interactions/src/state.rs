//! In-memory interaction list, current extraction and operation status.
//!
//! All changes go through [`InteractionState::apply`], one event per
//! dispatched intent or resolved gateway call.

use record::{ExtractionResult, InteractionRecord, RecordId};
use std::collections::{HashMap, VecDeque};

use crate::status::{OperationId, OperationKind, OperationStatus, Status};

pub const DEFAULT_HISTORY_LIMIT: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub id: OperationId,
    pub kind: OperationKind,
    pub status: OperationStatus,
}

/// The extraction currently on display, with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentExtraction {
    pub op: OperationId,
    pub source_text: String,
    pub result: ExtractionResult,
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    Started {
        op: OperationId,
        kind: OperationKind,
    },
    Fetched {
        op: OperationId,
        records: Vec<InteractionRecord>,
    },
    Created {
        op: OperationId,
        record: InteractionRecord,
    },
    Updated {
        op: OperationId,
        record: InteractionRecord,
    },
    Deleted {
        op: OperationId,
        id: RecordId,
    },
    Extracted {
        op: OperationId,
        source_text: String,
        result: ExtractionResult,
    },
    Failed {
        op: OperationId,
        message: String,
    },
    ExtractionDismissed,
}

#[derive(Debug, Clone)]
pub struct InteractionState {
    list: Vec<InteractionRecord>,
    extraction: Option<CurrentExtraction>,
    // Only a result from this operation may become `extraction`.
    latest_extraction: Option<OperationId>,
    operations: HashMap<OperationId, Operation>,
    settled: VecDeque<OperationId>,
    history_limit: usize,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl InteractionState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            list: Vec::new(),
            extraction: None,
            latest_extraction: None,
            operations: HashMap::new(),
            settled: VecDeque::new(),
            history_limit: history_limit.max(1),
        }
    }

    pub fn list(&self) -> &[InteractionRecord] {
        &self.list
    }

    pub fn record(&self, id: RecordId) -> Option<&InteractionRecord> {
        self.list.iter().find(|r| r.id == id)
    }

    pub fn extraction(&self) -> Option<&CurrentExtraction> {
        self.extraction.as_ref()
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(&id)
    }

    pub fn is_loading(&self) -> bool {
        self.operations.values().any(|op| op.status.is_loading())
    }

    pub fn is_loading_kind(&self, kind: OperationKind) -> bool {
        self.operations
            .values()
            .any(|op| op.kind == kind && op.status.is_loading())
    }

    /// Loading while anything is in flight, otherwise the outcome of the
    /// most recently settled operation.
    pub fn status(&self) -> Status {
        if self.is_loading() {
            return Status::Loading;
        }
        match self.last_settled().map(|op| &op.status) {
            None => Status::Idle,
            Some(OperationStatus::Loading) => Status::Loading,
            Some(OperationStatus::Succeeded) => Status::Succeeded,
            Some(OperationStatus::Failed(_)) => Status::Failed,
        }
    }

    /// Message of the most recently settled operation, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_settled().and_then(|op| op.status.error())
    }

    /// Failures still in the settled history, oldest first.
    pub fn failures(&self) -> Vec<&Operation> {
        self.settled
            .iter()
            .filter_map(|id| self.operations.get(id))
            .filter(|op| op.status.error().is_some())
            .collect()
    }

    fn last_settled(&self) -> Option<&Operation> {
        self.settled.back().and_then(|id| self.operations.get(id))
    }

    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Started { op, kind } => {
                if kind == OperationKind::Extract {
                    // never show a stale result next to a loading indicator
                    self.extraction = None;
                    self.latest_extraction = Some(op);
                }
                self.operations.insert(
                    op,
                    Operation {
                        id: op,
                        kind,
                        status: OperationStatus::Loading,
                    },
                );
            }
            StoreEvent::Fetched { op, records } => {
                self.list = records;
                self.settle(op, OperationStatus::Succeeded);
            }
            StoreEvent::Created { op, record } => {
                self.list.retain(|r| r.id != record.id);
                self.list.insert(0, record);
                self.settle(op, OperationStatus::Succeeded);
            }
            StoreEvent::Updated { op, record } => {
                if let Some(slot) = self.list.iter_mut().find(|r| r.id == record.id) {
                    *slot = record;
                }
                self.settle(op, OperationStatus::Succeeded);
            }
            StoreEvent::Deleted { op, id } => {
                self.list.retain(|r| r.id != id);
                self.settle(op, OperationStatus::Succeeded);
            }
            StoreEvent::Extracted { op, source_text, result } => {
                if self.latest_extraction == Some(op) {
                    self.extraction = Some(CurrentExtraction { op, source_text, result });
                } else {
                    tracing::debug!(op = %op, "Discarding stale extraction result");
                }
                self.settle(op, OperationStatus::Succeeded);
            }
            StoreEvent::Failed { op, message } => {
                self.settle(op, OperationStatus::Failed(message));
            }
            StoreEvent::ExtractionDismissed => {
                self.extraction = None;
                self.latest_extraction = None;
            }
        }
    }

    fn settle(&mut self, op: OperationId, status: OperationStatus) {
        let Some(operation) = self.operations.get_mut(&op) else {
            tracing::debug!(op = %op, "Outcome for an operation that was never started");
            return;
        };
        operation.status = status;
        self.settled.retain(|id| *id != op);
        self.settled.push_back(op);

        while self.settled.len() > self.history_limit {
            if let Some(evicted) = self.settled.pop_front() {
                self.operations.remove(&evicted);
            }
        }
    }
}
