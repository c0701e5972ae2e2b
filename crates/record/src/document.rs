use crate::schema::{InteractionRecord, RecordId, Sentiment};

#[derive(Debug, thiserror::Error)]
pub enum EditDeserializationError {
    #[error("document is not a valid interaction record: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("document id {found} does not match the record being edited ({expected})")]
    IdMismatch { expected: RecordId, found: RecordId },
    #[error("top-level sentiment `{top_level}` differs from structured_data.sentiment `{structured}`")]
    SentimentMismatch { top_level: Sentiment, structured: Sentiment },
}

/// Pretty JSON snapshot of a record, for editing as text.
pub fn render_raw_document(record: &InteractionRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Parse an edited snapshot back into a record bound for `PUT`.
pub fn parse_raw_document(text: &str, expected: RecordId) -> Result<InteractionRecord, EditDeserializationError> {
    let record: InteractionRecord = serde_json::from_str(text)?;
    if record.id != expected {
        return Err(EditDeserializationError::IdMismatch {
            expected,
            found: record.id,
        });
    }
    if !record.sentiment_consistent() {
        return Err(EditDeserializationError::SentimentMismatch {
            top_level: record.sentiment,
            structured: record.structured_data.sentiment,
        });
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use chrono::Utc;

    fn record() -> InteractionRecord {
        let draft = Draft {
            hcp_name: "Dr. Smith".to_string(),
            topics: "Efficacy".to_string(),
            ..Draft::default()
        };
        InteractionRecord::from_payload(RecordId(4), draft.to_payload(""), Utc::now())
    }

    #[test]
    fn test_edit_round_trip() {
        let original = record();
        let text = render_raw_document(&original).unwrap();
        let edited = text.replace("Efficacy", "Safety");

        let parsed = parse_raw_document(&edited, RecordId(4)).unwrap();
        assert_eq!(parsed.structured_data.topics, vec!["Safety"]);
        assert_eq!(parsed.id, original.id);
    }

    #[test]
    fn test_rejects_malformed_documents() {
        let text = render_raw_document(&record()).unwrap();

        let truncated = &text[..text.len() / 2];
        assert!(matches!(
            parse_raw_document(truncated, RecordId(4)),
            Err(EditDeserializationError::Invalid(_))
        ));

        assert!(matches!(
            parse_raw_document(&text, RecordId(5)),
            Err(EditDeserializationError::IdMismatch { .. })
        ));

        let bad_sentiment = text.replacen("\"sentiment\": \"neutral\"", "\"sentiment\": \"positive\"", 1);
        assert!(matches!(
            parse_raw_document(&bad_sentiment, RecordId(4)),
            Err(EditDeserializationError::SentimentMismatch { .. })
        ));

        assert!(matches!(
            parse_raw_document("{\"id\": 4, \"sentiment\": \"ecstatic\"}", RecordId(4)),
            Err(EditDeserializationError::Invalid(_))
        ));
    }
}
