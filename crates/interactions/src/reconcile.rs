//! Moves data between the draft, extraction and persisted shapes.
//!
//! A draft only reaches the remote store through [`to_persisted`], and an
//! extraction only reaches a draft through [`merge_extraction`].

use record::{Draft, ExtractionResult, ExtractionShapeError, InteractionPayload, Sentiment};
use serde_json::Value;

/// Values from an extraction that take precedence over the draft when
/// building the persisted top-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub summary: Option<String>,
    pub sentiment: Option<Sentiment>,
}

pub fn overrides_from(result: &ExtractionResult) -> Overrides {
    Overrides {
        summary: result
            .interaction
            .summary
            .clone()
            .filter(|s| !s.trim().is_empty()),
        sentiment: result.sentiment(),
    }
}

/// Overwrite the draft with every field the extraction carries.
pub fn merge_extraction(draft: &mut Draft, result: &ExtractionResult) {
    *draft = Draft::from_extraction(result, draft);
}

/// Decode a raw extraction response and merge it. On a shape error the
/// draft is left untouched.
pub fn merge_extraction_value(draft: &mut Draft, value: Value) -> Result<ExtractionResult, ExtractionShapeError> {
    let result = ExtractionResult::from_value(value)?;
    merge_extraction(draft, &result);
    Ok(result)
}

/// Build the payload sent to `create`. A sentiment override is written to
/// both sentiment fields and back into the draft.
pub fn to_persisted(draft: &mut Draft, source_text: &str, overrides: &Overrides) -> InteractionPayload {
    if let Some(sentiment) = overrides.sentiment {
        draft.sentiment = sentiment;
    }

    let mut payload = draft.to_payload(source_text);
    if let Some(summary) = &overrides.summary {
        payload.summary = summary.clone();
    }
    payload
}

/// Follow-up suggestions in display order, whichever shape the service used.
pub fn suggested_followups(result: &ExtractionResult) -> Vec<String> {
    result.followups.items()
}
