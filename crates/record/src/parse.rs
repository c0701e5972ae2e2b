//! Grammar for the free-text list fields of a draft.
//!
//! ```text
//! comma_list := item ("," item)*      attendees
//! line_list  := item ("\n" item)*     topics, follow-up tasks ("\r\n" accepted)
//! item       := any text; surrounding whitespace is trimmed and empty items are dropped
//! sample     := name [":" quantity]   or   name " x" quantity
//! date       := YYYY-MM-DD
//! time       := HH:MM | HH:MM:SS
//! ```
//!
//! Empty input always yields an empty list, never a list with one blank entry.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::schema::Sample;

pub const COMMA_SEPARATOR: &str = ", ";
pub const LINE_SEPARATOR: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("sample name is empty")]
    EmptySampleName,
    #[error("invalid sample quantity `{0}`")]
    InvalidQuantity(String),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),
}

/// Split comma separated text into trimmed, non-empty items.
pub fn parse_comma_list(text: &str) -> Vec<String> {
    split_trimmed(text.split(','))
}

/// Split newline separated text into trimmed, non-empty items.
pub fn parse_line_list(text: &str) -> Vec<String> {
    split_trimmed(text.lines())
}

pub fn join_comma_list(items: &[String]) -> String {
    items.join(COMMA_SEPARATOR)
}

pub fn join_line_list(items: &[String]) -> String {
    items.join(LINE_SEPARATOR)
}

fn split_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `Name:3`, `Name x3` or a bare `Name` (quantity 1).
pub fn parse_sample(text: &str) -> Result<Sample, ParseError> {
    let text = text.trim();
    let (name, quantity) = if let Some((name, qty)) = text.rsplit_once(':') {
        (name, Some(qty))
    } else if let Some((name, qty)) = text.rsplit_once(" x") {
        // "Brochure x" with no digits is just a name
        if qty.trim().chars().all(|c| c.is_ascii_digit()) && !qty.trim().is_empty() {
            (name, Some(qty))
        } else {
            (text, None)
        }
    } else {
        (text, None)
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::EmptySampleName);
    }
    let quantity = match quantity {
        Some(qty) => qty
            .trim()
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidQuantity(qty.trim().to_string()))?,
        None => 1,
    };
    Ok(Sample::new(name, quantity))
}

pub fn format_sample(sample: &Sample) -> String {
    format!("{} x{}", sample.name, sample.quantity)
}

pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| ParseError::InvalidDate(text.to_string()))
}

pub fn parse_time(text: &str) -> Result<NaiveTime, ParseError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map_err(|_| ParseError::InvalidTime(text.to_string()))
}

/// Meeting time is only known when both components are.
pub fn combine_meeting_time(date: Option<NaiveDate>, time: Option<NaiveTime>) -> Option<DateTime<Utc>> {
    match (date, time) {
        (Some(date), Some(time)) => Some(date.and_time(time).and_utc()),
        _ => None,
    }
}
