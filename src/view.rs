//! Read-only views derived from [`SessionState`].
//!
//! The renderer never looks at session fields directly. It asks for a
//! [`SessionView`], which decides which panel is visible and how much of the
//! history sidebar to show.

use crate::article::ArticleContent;
use crate::format::{extract_query_text, format_timestamp, humanize_identifier};
use crate::record::SearchRecord;
use crate::session::SessionState;

/// Number of history entries shown while the sidebar is collapsed.
pub const HISTORY_PREVIEW_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct ResultView<'a> {
    pub record: &'a SearchRecord,
    pub question: String,
    pub summary: &'a str,
    pub articles: Vec<ArticleLink>,
}

impl<'a> ResultView<'a> {
    pub fn from_record(record: &'a SearchRecord) -> Self {
        Self {
            record,
            question: extract_query_text(&record.query_text),
            summary: &record.ai_summary_answer,
            articles: record
                .relevant_articles
                .iter()
                .map(|id| ArticleLink {
                    id: id.clone(),
                    title: humanize_identifier(id),
                })
                .collect(),
        }
    }
}

/// The primary panel, in precedence order.
#[derive(Debug, Clone)]
pub enum Panel<'a> {
    ArticleDetail(ArticleContent),
    Result(ResultView<'a>),
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryToggle {
    ViewAll,
    ShowLess,
}

impl HistoryToggle {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryToggle::ViewAll => "View all",
            HistoryToggle::ShowLess => "Show less",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: i64,
    pub question: String,
    pub created: String,
}

#[derive(Debug, Clone)]
pub struct HistoryView {
    pub items: Vec<HistoryItem>,
    pub total: usize,
    /// `None` when the history is short enough to show in full
    pub toggle: Option<HistoryToggle>,
}

#[derive(Debug, Clone)]
pub struct SessionView<'a> {
    pub panel: Panel<'a>,
    pub history: HistoryView,
    pub error: Option<&'a str>,
    pub loading: bool,
}

pub fn select_panel(session: &SessionState) -> Panel<'_> {
    if let Some(id) = session.selected_article() {
        Panel::ArticleDetail(ArticleContent::placeholder(id))
    } else if let Some(record) = session.latest() {
        Panel::Result(ResultView::from_record(record))
    } else {
        Panel::Welcome
    }
}

pub fn history_view(session: &SessionState) -> HistoryView {
    let history = session.history();
    let visible = if session.history_expanded() {
        history.len()
    } else {
        history.len().min(HISTORY_PREVIEW_LEN)
    };

    let toggle = if session.history_toggle_offered() {
        Some(if session.history_expanded() {
            HistoryToggle::ShowLess
        } else {
            HistoryToggle::ViewAll
        })
    } else {
        None
    };

    HistoryView {
        items: history[..visible]
            .iter()
            .map(|r| HistoryItem {
                id: r.id,
                question: extract_query_text(&r.query_text),
                created: format_timestamp(&r.created_at),
            })
            .collect(),
        total: history.len(),
        toggle,
    }
}

impl SessionState {
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            panel: select_panel(self),
            history: history_view(self),
            error: self.error(),
            loading: self.in_flight(),
        }
    }
}
