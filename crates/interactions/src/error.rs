use extract::{ExtractError, ExtractionServiceError};
use record::{EditDeserializationError, ExtractionShapeError};
use remote::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("interaction store request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("extraction service failed: {0}")]
    ExtractionService(#[from] ExtractionServiceError),
    #[error("extraction result is malformed: {0}")]
    ExtractionShape(#[from] ExtractionShapeError),
    /// Local to the edit affordance; never recorded as a failed operation.
    #[error("edit rejected: {0}")]
    EditDeserialization(#[from] EditDeserializationError),
    #[error("could not render interaction document: {0}")]
    Render(serde_json::Error),
    #[error("there is no extraction result to save")]
    NoExtraction,
    #[error("interaction {0} is not in the list")]
    UnknownRecord(record::RecordId),
}

impl From<ExtractError> for InteractionError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Service(e) => Self::ExtractionService(e),
            ExtractError::Shape(e) => Self::ExtractionShape(e),
        }
    }
}

impl InteractionError {
    /// Whether this error is recorded against an operation. Local
    /// validation errors only block the action that raised them.
    pub fn is_operation_failure(&self) -> bool {
        !matches!(
            self,
            Self::EditDeserialization(_) | Self::Render(_) | Self::NoExtraction | Self::UnknownRecord(_)
        )
    }
}
