use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::extraction::ExtractionResult;
use crate::parse::{
    combine_meeting_time, format_sample, join_comma_list, join_line_list, parse_comma_list, parse_line_list,
};
use crate::schema::{InteractionPayload, InteractionType, Sample, Sentiment, StructuredData};

/// Editable, unsaved interaction data as held by a form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Draft {
    pub hcp_name: String,
    pub interaction_type: InteractionType,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Comma separated names.
    pub attendees: String,
    /// One topic per line.
    pub topics: String,
    pub materials: Vec<String>,
    pub samples: Vec<Sample>,
    pub sentiment: Sentiment,
    pub outcomes: String,
    /// One follow-up task per line.
    pub followups: String,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    pub fn add_material(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.materials.push(name.to_string());
        }
    }

    pub fn add_sample(&mut self, name: &str, quantity: u32) {
        let name = name.trim();
        if !name.is_empty() {
            self.samples.push(Sample::new(name, quantity));
        }
    }

    /// Raw text used when the form has neither source text nor outcomes.
    pub fn fallback_raw_text(&self) -> String {
        format!("Met {} ({}).", self.hcp_name.trim(), self.interaction_type)
    }

    /// Render every field into the fixed template sent to the extraction service.
    pub fn to_source_text(&self) -> String {
        let samples: Vec<String> = self.samples.iter().map(format_sample).collect();
        format!(
            "HCP: {}\nInteraction Type: {}\nAttendees: {}\nTopics: {}\nMaterials: {}\nSamples: {}\nSentiment: {}\nOutcomes: {}\nFollowups: {}\n",
            self.hcp_name.trim(),
            self.interaction_type,
            self.attendees.trim(),
            join_comma_list(&parse_line_list(&self.topics)),
            self.materials.join(", "),
            samples.join(", "),
            self.sentiment,
            self.outcomes.trim(),
            join_comma_list(&parse_line_list(&self.followups)),
        )
    }

    /// Normalize the draft into the shape the remote store persists.
    ///
    /// `source_text` becomes `raw_text` when it is not blank; otherwise the
    /// outcomes text is used, and failing that a one-line synthesized note.
    pub fn to_payload(&self, source_text: &str) -> InteractionPayload {
        let hcp_name = self.hcp_name.trim();
        let structured_data = StructuredData {
            hcp_name: (!hcp_name.is_empty()).then(|| hcp_name.to_string()),
            interaction_type: self.interaction_type,
            attendees: parse_comma_list(&self.attendees),
            topics: parse_line_list(&self.topics),
            materials_shared: self
                .materials
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            samples_distributed: self.samples.clone(),
            sentiment: self.sentiment,
            outcomes: self.outcomes.clone(),
            follow_up_tasks: parse_line_list(&self.followups),
            extra: Default::default(),
        };

        let raw_text = if !source_text.trim().is_empty() {
            source_text.to_string()
        } else if !self.outcomes.trim().is_empty() {
            self.outcomes.clone()
        } else {
            self.fallback_raw_text()
        };

        InteractionPayload {
            raw_text,
            structured_data,
            summary: self.outcomes.clone(),
            sentiment: self.sentiment,
            meeting_time: combine_meeting_time(self.date, self.time),
        }
    }

    /// Rehydrate draft fields from an extraction.
    ///
    /// Present values overwrite, present-but-empty values clear. Absent
    /// fields the service is contracted to return are treated as empty;
    /// absent interaction type, attendees and the date/time components,
    /// which the service does not produce, keep their value from `prior`.
    pub fn from_extraction(result: &ExtractionResult, prior: &Draft) -> Draft {
        let data = &result.interaction.structured_data;
        Draft {
            hcp_name: data.hcp_name.clone().unwrap_or_default(),
            interaction_type: data.interaction_type.unwrap_or(prior.interaction_type),
            date: prior.date,
            time: prior.time,
            attendees: data
                .attendees
                .as_deref()
                .map(join_comma_list)
                .unwrap_or_else(|| prior.attendees.clone()),
            topics: join_line_list(data.topics.as_deref().unwrap_or_default()),
            materials: data.materials_shared.clone().unwrap_or_default(),
            samples: data.samples_distributed.clone().unwrap_or_default(),
            sentiment: result.sentiment().unwrap_or_default(),
            outcomes: result
                .interaction
                .summary
                .clone()
                .or_else(|| data.outcomes.clone())
                .unwrap_or_default(),
            followups: join_line_list(data.follow_up_tasks.as_deref().unwrap_or_default()),
        }
    }
}
