pub fn build_extraction_prompt(note: &str) -> String {
    format!(
        r#"You are an assistant for a pharma CRM. From the interaction note below, extract structured JSON.

SCHEMA:
{{
  "hcp_name": "string",
  "designation": "string or null",
  "topics": ["string"],
  "materials_shared": ["string"],
  "samples_distributed": [{{"name": "string", "quantity": 1}}],
  "sentiment": "positive|neutral|negative",
  "follow_up_tasks": ["string"],
  "meeting_time": "ISO-8601 string or null"
}}

RULES:
- Use an empty array when the note mentions nothing for a list field
- Sentiment must be exactly one of: positive, neutral, negative
- Output ONLY the JSON object, no markdown, no explanations

INTERACTION NOTE:
"""{}"""

JSON OUTPUT:"#,
        note
    )
}

pub fn build_summary_prompt(note: &str) -> String {
    format!(
        r#"Summarize the following HCP interaction in 1-2 concise sentences,
suitable as a CRM log summary:

"""{}"""

Summary:"#,
        note
    )
}

pub fn build_followup_prompt(structured_json: &str) -> String {
    format!(
        r#"You are an expert pharma sales assistant. Based on the interaction JSON below,
suggest up to 3 prioritized follow-up actions.

Return them as a JSON array of strings.

Interaction:
{}"#,
        structured_json
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON object."#,
        invalid_json
    )
}
