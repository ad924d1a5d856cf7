//! Session state for one run of the client.
//!
//! `SessionState` is the single owner of everything the search screen shows:
//! the input text, the in-flight and error flags, the latest result, the
//! history and the article selection. All transitions go through the methods
//! below; rendering reads the derived [`crate::view::SessionView`].
//!
//! ```text
//! EMPTY  --submit(non-empty)--> LOADING
//! LOADING --success--> RESULT
//! LOADING --failure--> ERROR (input kept)
//! RESULT --select_article--> ARTICLE_DETAIL
//! ARTICLE_DETAIL --back--> RESULT (or EMPTY)
//! RESULT/ERROR --submit--> LOADING
//! ```

use crate::error::Result;
use crate::record::{sort_newest_first, SearchRecord};

/// Banner shown when a submission fails, whatever the cause.
pub const SUBMIT_FAILED_MESSAGE: &str = "Backend not reachable";

/// Banner shown when the startup history load fails.
pub const HISTORY_FAILED_MESSAGE: &str = "Failed to load search history";

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    input: String,
    in_flight: bool,
    error: Option<String>,
    latest: Option<SearchRecord>,
    history: Vec<SearchRecord>,
    selected_article: Option<String>,
    history_expanded: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn latest(&self) -> Option<&SearchRecord> {
        self.latest.as_ref()
    }

    /// All records received this session, highest id first
    pub fn history(&self) -> &[SearchRecord] {
        &self.history
    }

    pub fn selected_article(&self) -> Option<&str> {
        self.selected_article.as_deref()
    }

    pub fn history_expanded(&self) -> bool {
        self.history_expanded
    }

    /// Start a submission of the current input.
    ///
    /// Returns the query to send, or `None` when nothing should be sent: the
    /// trimmed input is empty, or a submission is already in flight. `None`
    /// leaves the state untouched.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.in_flight || self.input.trim().is_empty() {
            return None;
        }

        self.error = None;
        self.in_flight = true;
        self.selected_article = None;
        Some(self.input.clone())
    }

    /// Apply the outcome of the request started by [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, result: Result<SearchRecord>) {
        self.in_flight = false;

        match result {
            Ok(record) => {
                tracing::info!(id = record.id, "search query completed");
                self.history.retain(|r| r.id != record.id);
                self.history.insert(0, record.clone());
                sort_newest_first(&mut self.history);
                self.latest = Some(record);
                self.input.clear();
            }
            Err(e) => {
                tracing::warn!(error = %e, "search query failed");
                self.error = Some(SUBMIT_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Apply the outcome of the one-shot history load.
    ///
    /// Loaded records are merged with any the session already holds, so a
    /// submission that finished first is neither lost nor duplicated.
    pub fn apply_history(&mut self, result: Result<Vec<SearchRecord>>) {
        match result {
            Ok(records) => {
                tracing::info!(count = records.len(), "search history loaded");
                let mut merged = records;
                merged.retain(|r| !self.history.iter().any(|h| h.id == r.id));
                merged.append(&mut self.history);
                sort_newest_first(&mut merged);
                self.history = merged;
            }
            Err(e) => {
                tracing::warn!(error = %e, "search history load failed");
                self.error = Some(HISTORY_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Show the detail view for an article. The latest result is kept.
    pub fn select_article(&mut self, id: &str) {
        self.selected_article = Some(id.to_string());
    }

    /// Leave the detail view, returning to whatever was shown before it.
    pub fn back(&mut self) {
        self.selected_article = None;
    }

    /// The "view all / show less" toggle only exists for long histories.
    pub fn history_toggle_offered(&self) -> bool {
        self.history.len() > crate::view::HISTORY_PREVIEW_LEN
    }

    pub fn toggle_history(&mut self) {
        if self.history_toggle_offered() {
            self.history_expanded = !self.history_expanded;
        }
    }
}
