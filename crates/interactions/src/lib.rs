pub mod error;
pub mod metrics;
pub mod reconcile;
pub mod service;
pub mod state;
pub mod status;

pub use error::InteractionError;
pub use metrics::{KindSnapshot, Metrics, MetricsSnapshot};
pub use reconcile::{merge_extraction, merge_extraction_value, overrides_from, suggested_followups, to_persisted, Overrides};
pub use service::InteractionService;
pub use state::{CurrentExtraction, InteractionState, Operation, StoreEvent};
pub use status::{OperationId, OperationKind, OperationStatus, Status};
