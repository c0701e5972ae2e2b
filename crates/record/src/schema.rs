use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::timestamp;

/// Identifier assigned by the remote store when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0.to_string())
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum InteractionType {
    #[default]
    Meeting,
    Call,
    Virtual,
    Event,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meeting => "Meeting",
            Self::Call => "Call",
            Self::Virtual => "Virtual",
            Self::Event => "Event",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meeting" => Ok(Self::Meeting),
            "call" => Ok(Self::Call),
            "virtual" => Ok(Self::Virtual),
            "event" => Ok(Self::Event),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(pub String);

// Both enums accept any casing on the wire ("Positive", "MEETING") but
// always serialize in their canonical form.
macro_rules! case_insensitive_deserialize {
    ($ty:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

case_insensitive_deserialize!(InteractionType);
case_insensitive_deserialize!(Sentiment);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    #[serde(default = "default_quantity", deserialize_with = "lenient_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

// Model output reaches the store unchecked, so `"2"` and `null` both occur.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    let quantity = match &raw {
        None => return Ok(default_quantity()),
        Some(Value::Number(n)) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    Ok(quantity.unwrap_or_else(|| {
        tracing::warn!(value = ?raw, "Unreadable sample quantity, using 1");
        default_quantity()
    }))
}

impl Sample {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Structured view of an interaction.
///
/// Keys written by other producers (an AI backend adds `designation` and
/// `meeting_time`, for instance) are kept in `extra` so a read-modify-write
/// cycle does not drop them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredData {
    #[serde(default)]
    pub hcp_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub interaction_type: InteractionType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attendees: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub materials_shared: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub samples_distributed: Vec<Sample>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub sentiment: Sentiment,
    #[serde(default, deserialize_with = "null_as_default")]
    pub outcomes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_up_tasks: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /interactions`: a record the store has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionPayload {
    pub raw_text: String,
    pub structured_data: StructuredData,
    pub summary: String,
    pub sentiment: Sentiment,
    #[serde(default, with = "timestamp::option")]
    pub meeting_time: Option<DateTime<Utc>>,
}

impl InteractionPayload {
    /// True when the top-level sentiment mirrors the structured one.
    pub fn sentiment_consistent(&self) -> bool {
        self.sentiment == self.structured_data.sentiment
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub structured_data: StructuredData,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub sentiment: Sentiment,
    #[serde(default, with = "timestamp::option")]
    pub meeting_time: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InteractionRecord {
    /// Attach store-assigned metadata to a payload.
    pub fn from_payload(id: RecordId, payload: InteractionPayload, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            raw_text: payload.raw_text,
            structured_data: payload.structured_data,
            summary: payload.summary,
            sentiment: payload.sentiment,
            meeting_time: payload.meeting_time,
            created_at: Some(created_at),
            updated_at: Some(created_at),
        }
    }

    pub fn payload(&self) -> InteractionPayload {
        InteractionPayload {
            raw_text: self.raw_text.clone(),
            structured_data: self.structured_data.clone(),
            summary: self.summary.clone(),
            sentiment: self.sentiment,
            meeting_time: self.meeting_time,
        }
    }

    pub fn sentiment_consistent(&self) -> bool {
        self.sentiment == self.structured_data.sentiment
    }

    /// Name shown in list views.
    pub fn display_name(&self) -> &str {
        match self.structured_data.hcp_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Unknown HCP",
        }
    }

    /// Summary for list views, falling back to the first 120 characters of the raw text.
    pub fn display_summary(&self) -> String {
        if !self.summary.trim().is_empty() {
            return self.summary.clone();
        }
        let excerpt: String = self.raw_text.chars().take(120).collect();
        if excerpt.trim().is_empty() {
            "No summary available.".to_string()
        } else {
            excerpt
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a stored enum, falling back to its default for `null` or a value
/// outside the known set.
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        None => return Ok(T::default()),
        Some(Value::String(s)) => s.parse().ok(),
        Some(_) => None,
    };
    Ok(parsed.unwrap_or_else(|| {
        tracing::warn!(value = ?raw, "Unknown stored value, using default");
        T::default()
    }))
}
