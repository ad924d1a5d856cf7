use serde::{Deserialize, Serialize};

/// One completed search as stored by the backend.
///
/// Records are created exclusively by the backend and never modified on the
/// client. Timestamps are kept as the ISO-8601 strings the backend sent and
/// are only parsed for display (see [`crate::format::format_timestamp`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    /// Raw query payload, either plain text or a serialized `{"query": ...}` object
    pub query_text: String,
    pub ai_summary_answer: String,
    #[serde(default)]
    pub relevant_articles: Vec<String>,
}

/// Body sent to the creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQueryRequest {
    pub query: String,
}

/// Sort records the way history is displayed: newest (highest id) first.
pub fn sort_newest_first(records: &mut [SearchRecord]) {
    records.sort_by(|a, b| b.id.cmp(&a.id));
}
