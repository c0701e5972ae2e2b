pub mod document;
pub mod draft;
pub mod extraction;
pub mod parse;
pub mod schema;
pub mod timestamp;

pub use document::{parse_raw_document, render_raw_document, EditDeserializationError};
pub use draft::Draft;
pub use extraction::{ExtractedData, ExtractedInteraction, ExtractionResult, ExtractionShapeError, Followups};
pub use schema::{
    InteractionPayload, InteractionRecord, InteractionType, RecordId, Sample, Sentiment, StructuredData,
};
