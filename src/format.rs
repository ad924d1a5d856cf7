//! Display formatting for search records and article identifiers.
//!
//! Everything here is pure: no state, no I/O. Decode failures are recovered
//! locally and only show up in the log.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

#[derive(Deserialize)]
struct StructuredQuery {
    query: String,
}

/// A raw `queryText` payload after an attempt to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPayload {
    /// A serialized object carrying a `query` field
    Structured { query: String },
    /// Anything else, kept verbatim
    Raw(String),
}

impl QueryPayload {
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<StructuredQuery>(raw) {
            Ok(structured) => QueryPayload::Structured {
                query: structured.query,
            },
            Err(e) => {
                tracing::debug!(error = %e, "query text is not a structured payload, showing raw text");
                QueryPayload::Raw(raw.to_string())
            }
        }
    }

    pub fn into_text(self) -> String {
        match self {
            QueryPayload::Structured { query } => query,
            QueryPayload::Raw(text) => text,
        }
    }
}

/// The question text to show for a record's raw `queryText`.
pub fn extract_query_text(raw: &str) -> String {
    QueryPayload::decode(raw).into_text()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Turn an article identifier into a title: hyphens become spaces and the
/// first letter of every word is upper-cased. The rest of each word is left
/// as it was.
pub fn humanize_identifier(id: &str) -> String {
    let mut title = String::with_capacity(id.len());
    let mut prev_is_word = false;

    for c in id.chars() {
        let c = if c == '-' { ' ' } else { c };
        if is_word_char(c) && !prev_is_word {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        prev_is_word = is_word_char(c);
    }

    title
}

/// Render an ISO-8601 timestamp as `YYYY-MM-DD HH:MM`.
///
/// Accepts RFC 3339 (with offset) and offset-less date-times. Anything else
/// is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY).to_string();
    }

    tracing::debug!(timestamp = raw, "unrecognized timestamp format");
    raw.to_string()
}

/// Shorten `text` to at most `max_chars` characters, ending in an ellipsis
/// when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}
