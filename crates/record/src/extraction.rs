use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::schema::{InteractionPayload, InteractionType, Sample, Sentiment};

/// Keys an extraction is expected to fill. A `structured_data` object with
/// none of them is what a backend sends when the model's JSON was unusable.
pub const EXTRACTION_FIELDS: [&str; 9] = [
    "hcp_name",
    "interaction_type",
    "attendees",
    "topics",
    "materials_shared",
    "samples_distributed",
    "sentiment",
    "outcomes",
    "follow_up_tasks",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionShapeError {
    #[error("extraction payload is not a JSON object")]
    NotAnObject,
    #[error("extraction payload has no `interaction` object")]
    MissingInteraction,
    #[error("extraction payload has no `interaction.structured_data` object")]
    MissingStructuredData,
    #[error("`structured_data` carries none of the expected fields")]
    NoRecognisedFields,
    #[error("extraction payload does not match the expected shape: {0}")]
    Invalid(String),
}

/// Transient output of the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub interaction: ExtractedInteraction,
    #[serde(default)]
    pub followups: Followups,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInteraction {
    pub structured_data: ExtractedData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// Extracted fields. `None` means the key was absent (or null) in the
/// response, which is distinct from a present-but-empty value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hcp_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum", skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<InteractionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_shared: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_distributed: Option<Vec<Sample>>,
    #[serde(default, deserialize_with = "lenient_enum", skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_tasks: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Suggested follow-ups arrive either as a list or as one block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Followups {
    List(Vec<String>),
    Text(String),
}

impl Default for Followups {
    fn default() -> Self {
        Followups::List(Vec::new())
    }
}

impl Followups {
    /// Individual suggestions, with list bullets stripped from the text form.
    pub fn items(&self) -> Vec<String> {
        match self {
            Followups::List(items) => items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            Followups::Text(text) => text
                .lines()
                .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
        }
    }
}

impl ExtractionResult {
    /// Validate and decode a raw extraction response.
    pub fn from_value(value: Value) -> Result<Self, ExtractionShapeError> {
        let object = value.as_object().ok_or(ExtractionShapeError::NotAnObject)?;
        let interaction = object
            .get("interaction")
            .and_then(Value::as_object)
            .ok_or(ExtractionShapeError::MissingInteraction)?;
        let structured = interaction
            .get("structured_data")
            .and_then(Value::as_object)
            .ok_or(ExtractionShapeError::MissingStructuredData)?;
        if !EXTRACTION_FIELDS.iter().any(|key| structured.contains_key(*key)) {
            return Err(ExtractionShapeError::NoRecognisedFields);
        }

        serde_json::from_value(value).map_err(|e| ExtractionShapeError::Invalid(e.to_string()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ExtractionShapeError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| ExtractionShapeError::Invalid(e.to_string()))?;
        Self::from_value(value)
    }

    /// Extraction-shaped view of a persisted payload, with every field present.
    pub fn from_payload(payload: &InteractionPayload) -> Self {
        let data = &payload.structured_data;
        Self {
            interaction: ExtractedInteraction {
                structured_data: ExtractedData {
                    hcp_name: data.hcp_name.clone(),
                    interaction_type: Some(data.interaction_type),
                    attendees: Some(data.attendees.clone()),
                    topics: Some(data.topics.clone()),
                    materials_shared: Some(data.materials_shared.clone()),
                    samples_distributed: Some(data.samples_distributed.clone()),
                    sentiment: Some(data.sentiment),
                    outcomes: Some(data.outcomes.clone()),
                    follow_up_tasks: Some(data.follow_up_tasks.clone()),
                    extra: data.extra.clone(),
                },
                summary: Some(payload.summary.clone()),
                sentiment: Some(payload.sentiment),
            },
            followups: Followups::default(),
        }
    }

    /// Sentiment reported by the service, preferring the structured value.
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.interaction
            .structured_data
            .sentiment
            .or(self.interaction.sentiment)
    }
}

// Models phrase enum values loosely; an unrecognised value is treated as
// absent rather than failing the whole extraction.
fn lenient_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(value = %value, "Ignoring unrecognised enum value in extraction");
            None
        }
    }))
}
