use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::{JoinError, JoinHandle};

use crate::api::SearchBackend;
use crate::error::{self, ApiError};
use crate::record::SearchRecord;
use crate::session::SessionState;
use crate::view::{history_view, select_panel, Panel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Articles, // Related-article list of the result panel
    History,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Search session (input, result, history, article selection)
    pub session: SessionState,
    pub input_cursor: usize, // cursor position in the input, in chars

    // List and scroll state
    pub articles_state: ListState,
    pub history_state: ListState,
    pub content_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub content_area: Option<Rect>,
    pub history_area: Option<Rect>,

    // Backend and in-flight requests
    backend: Arc<dyn SearchBackend>,
    history_task: Option<JoinHandle<error::Result<Vec<SearchRecord>>>>,
    history_requested: bool,
    submit_task: Option<JoinHandle<error::Result<SearchRecord>>>,
}

fn flatten<T>(joined: Result<error::Result<T>, JoinError>) -> error::Result<T> {
    joined.map_err(ApiError::from).and_then(|result| result)
}

impl App {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            session: SessionState::new(),
            input_cursor: 0,

            articles_state: ListState::default(),
            history_state: ListState::default(),
            content_scroll: 0,

            animation_frame: 0,

            content_area: None,
            history_area: None,

            backend,
            history_task: None,
            history_requested: false,
            submit_task: None,
        }
    }

    /// Start the one-shot history load. Later calls do nothing.
    pub fn load_history(&mut self) {
        if self.history_requested {
            return;
        }
        self.history_requested = true;

        let backend = Arc::clone(&self.backend);
        self.history_task = Some(tokio::spawn(async move {
            backend.list_search_queries().await
        }));
    }

    /// Submit the current input. Ignored while a submission is outstanding
    /// or when the input is blank.
    pub fn submit(&mut self) {
        if self.submit_task.is_some() {
            return;
        }
        let Some(query) = self.session.begin_submit() else {
            return;
        };

        tracing::info!(query = %query, "submitting search query");
        self.content_scroll = 0;

        let backend = Arc::clone(&self.backend);
        self.submit_task = Some(tokio::spawn(async move {
            backend.create_search_query(&query).await
        }));
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_task.is_some()
    }

    /// Collect finished background requests and apply them to the session.
    pub async fn poll_tasks(&mut self) {
        if self.history_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.history_task.take() {
                self.on_history_loaded(flatten(task.await));
            }
        }

        if self.submit_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.submit_task.take() {
                self.on_submit_finished(flatten(task.await));
            }
        }
    }

    fn on_history_loaded(&mut self, result: error::Result<Vec<SearchRecord>>) {
        self.session.apply_history(result);
        self.clamp_history_selection();
    }

    fn on_submit_finished(&mut self, result: error::Result<SearchRecord>) {
        let succeeded = result.is_ok();
        self.session.finish_submit(result);
        self.input_cursor = self.input_cursor.min(self.session.input().chars().count());

        // A failure leaves the previous answer and history on screen, so
        // the list cursors stay where the user put them
        if succeeded {
            let has_articles = !self.related_articles().is_empty();
            self.articles_state.select(if has_articles { Some(0) } else { None });
            self.history_state.select(if self.session.history().is_empty() { None } else { Some(0) });
        }
    }

    /// Article ids of the result panel, empty when the panel isn't showing
    pub fn related_articles(&self) -> Vec<String> {
        match select_panel(&self.session) {
            Panel::Result(view) => view.articles.into_iter().map(|a| a.id).collect(),
            _ => Vec::new(),
        }
    }

    pub fn visible_history_len(&self) -> usize {
        history_view(&self.session).items.len()
    }

    pub fn showing_article(&self) -> bool {
        self.session.selected_article().is_some()
    }

    // Article drill-down
    pub fn open_selected_article(&mut self) {
        let articles = self.related_articles();
        if let Some(id) = self.articles_state.selected().and_then(|i| articles.get(i)) {
            tracing::debug!(article = %id, "opening article");
            self.session.select_article(id);
            self.content_scroll = 0;
        }
    }

    pub fn back(&mut self) {
        if self.showing_article() {
            self.session.back();
            self.content_scroll = 0;
        }
    }

    /// Put the question of the selected history entry back into the input
    pub fn recall_selected_history(&mut self) {
        let view = history_view(&self.session);
        if let Some(item) = self.history_state.selected().and_then(|i| view.items.get(i)) {
            let question = item.question.clone();
            self.session.set_input(&question);
            self.input_cursor = question.chars().count();
            self.focus = FocusPane::Input;
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn toggle_history(&mut self) {
        self.session.toggle_history();
        self.clamp_history_selection();
    }

    fn clamp_history_selection(&mut self) {
        let len = self.visible_history_len();
        let selected = match self.history_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.history_state.select(selected);
    }

    /// Tab order: input, related articles (when shown), history (when non-empty)
    pub fn cycle_focus(&mut self) {
        let has_articles = !self.related_articles().is_empty();
        let has_history = self.visible_history_len() > 0;

        self.focus = match self.focus {
            FocusPane::Input if has_articles => FocusPane::Articles,
            FocusPane::Input | FocusPane::Articles if has_history => FocusPane::History,
            _ => FocusPane::Input,
        };

        if self.focus == FocusPane::Articles && self.articles_state.selected().is_none() {
            self.articles_state.select(Some(0));
        }
        self.input_mode = if self.focus == FocusPane::Input {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
    }

    // List navigation
    pub fn articles_nav_down(&mut self) {
        let len = self.related_articles().len();
        if len > 0 {
            let i = self.articles_state.selected().unwrap_or(0);
            self.articles_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn articles_nav_up(&mut self) {
        let i = self.articles_state.selected().unwrap_or(0);
        self.articles_state.select(Some(i.saturating_sub(1)));
    }

    pub fn history_nav_down(&mut self) {
        let len = self.visible_history_len();
        if len > 0 {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn history_nav_up(&mut self) {
        let i = self.history_state.selected().unwrap_or(0);
        self.history_state.select(Some(i.saturating_sub(1)));
    }

    pub fn scroll_down(&mut self) {
        self.content_scroll = self.content_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    /// Advance the loading ellipsis (called on each poll event)
    pub fn tick_animation(&mut self) {
        if self.session.in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Wait for every outstanding request and apply it
    #[cfg(test)]
    pub async fn settle(&mut self) {
        if let Some(task) = self.history_task.take() {
            self.on_history_loaded(flatten(task.await));
        }
        if let Some(task) = self.submit_task.take() {
            self.on_submit_finished(flatten(task.await));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::SUBMIT_FAILED_MESSAGE;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory backend that hands out increasing ids
    #[derive(Default)]
    pub struct FakeBackend {
        pub history: Vec<SearchRecord>,
        pub fail_create: bool,
        pub fail_list: bool,
        pub next_id: Mutex<i64>,
        pub create_calls: AtomicUsize,
        pub list_calls: AtomicUsize,
        pub sent_queries: Mutex<Vec<String>>,
    }

    pub fn record(id: i64, query: &str) -> SearchRecord {
        SearchRecord {
            id,
            created_at: "2024-05-01T10:00:00Z".to_string(),
            updated_at: "2024-05-01T10:00:00Z".to_string(),
            query_text: serde_json::json!({ "query": query }).to_string(),
            ai_summary_answer: format!("Summary for {}", query),
            relevant_articles: vec![
                "systemd-service-restart".to_string(),
                "journalctl-basics".to_string(),
            ],
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn list_search_queries(&self) -> error::Result<Vec<SearchRecord>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(ApiError::Status(StatusCode::SERVICE_UNAVAILABLE));
            }
            Ok(self.history.clone())
        }

        async fn create_search_query(&self, query: &str) -> error::Result<SearchRecord> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.sent_queries.lock().unwrap().push(query.to_string());
            if self.fail_create {
                return Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            Ok(record(*next_id, query))
        }
    }

    fn app_with(backend: FakeBackend) -> (App, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let app = App::new(backend.clone());
        (app, backend)
    }

    #[tokio::test]
    async fn test_end_to_end_submit() {
        let (mut app, backend) = app_with(FakeBackend {
            next_id: Mutex::new(6),
            ..FakeBackend::default()
        });
        let question = "How do I restart a systemd service in Linux?";
        app.session.set_input(question);

        app.submit();
        assert!(app.session.in_flight());
        app.settle().await;

        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*backend.sent_queries.lock().unwrap(), vec![question.to_string()]);
        match select_panel(&app.session) {
            Panel::Result(view) => {
                assert_eq!(view.record.id, 7);
                assert_eq!(view.question, question);
                assert_eq!(view.summary, format!("Summary for {}", question));
            }
            _ => panic!("expected result panel"),
        }
        assert_eq!(app.session.history()[0].id, 7);
        assert_eq!(app.session.input(), "");
        assert_eq!(app.input_cursor, 0);
    }

    #[tokio::test]
    async fn test_blank_submit_makes_no_call() {
        let (mut app, backend) = app_with(FakeBackend::default());
        app.session.set_input("   ");

        app.submit();
        app.settle().await;

        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 0);
        assert!(!app.session.in_flight());
        assert!(app.session.history().is_empty());
    }

    #[tokio::test]
    async fn test_submit_ignored_while_outstanding() {
        let (mut app, backend) = app_with(FakeBackend::default());
        app.session.set_input("first");
        app.submit();
        app.submit();
        app.settle().await;

        assert_eq!(backend.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_each_submit_becomes_new_head() {
        let (mut app, _backend) = app_with(FakeBackend {
            history: vec![record(2, "b"), record(1, "a")],
            next_id: Mutex::new(2),
            ..FakeBackend::default()
        });
        app.load_history();
        app.settle().await;

        for query in ["c", "d"] {
            let head_before = app.session.history()[0].id;
            app.session.set_input(query);
            app.submit();
            app.settle().await;
            assert!(app.session.history()[0].id > head_before);
        }
        let ids: Vec<i64> = app.session.history().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_failed_submit_preserves_input() {
        let (mut app, _backend) = app_with(FakeBackend {
            fail_create: true,
            ..FakeBackend::default()
        });
        app.session.set_input("why is dns slow");
        app.input_cursor = 15;

        app.submit();
        app.settle().await;

        assert_eq!(app.session.error(), Some(SUBMIT_FAILED_MESSAGE));
        assert_eq!(app.session.input(), "why is dns slow");
        assert_eq!(app.input_cursor, 15);
        assert!(!app.is_submitting());
    }

    #[tokio::test]
    async fn test_failed_retry_keeps_list_selections() {
        let backend = Arc::new(FakeBackend {
            history: (1..=3).map(|id| record(id, "q")).collect(),
            next_id: Mutex::new(3),
            ..FakeBackend::default()
        });
        let mut app = App::new(backend);
        app.load_history();
        app.settle().await;
        app.session.set_input("restart nginx");
        app.submit();
        app.settle().await;

        app.articles_state.select(Some(1));
        app.history_state.select(Some(2));

        // Same session, backend now down
        app.backend = Arc::new(FakeBackend {
            fail_create: true,
            ..FakeBackend::default()
        });
        app.session.set_input("restart nginx again");
        app.submit();
        app.settle().await;

        assert_eq!(app.session.error(), Some(SUBMIT_FAILED_MESSAGE));
        assert_eq!(app.session.latest().map(|r| r.id), Some(4));
        assert_eq!(app.articles_state.selected(), Some(1));
        assert_eq!(app.history_state.selected(), Some(2));
    }

    #[tokio::test]
    async fn test_history_load_runs_once_and_sorts() {
        let (mut app, backend) = app_with(FakeBackend {
            history: vec![record(3, "c"), record(1, "a"), record(2, "b")],
            ..FakeBackend::default()
        });

        app.load_history();
        app.load_history();
        app.settle().await;

        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);
        let ids: Vec<i64> = app.session.history().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(app.history_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_history_load_failure() {
        let (mut app, _backend) = app_with(FakeBackend {
            fail_list: true,
            ..FakeBackend::default()
        });
        app.load_history();
        app.settle().await;

        assert!(app.session.history().is_empty());
        assert!(app.session.error().is_some());
        assert_eq!(app.history_state.selected(), None);
    }

    #[tokio::test]
    async fn test_poll_tasks_applies_finished_submission() {
        let (mut app, _backend) = app_with(FakeBackend::default());
        app.session.set_input("poll me");
        app.submit();

        for _ in 0..100 {
            app.poll_tasks().await;
            if !app.is_submitting() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert!(!app.is_submitting());
        assert_eq!(app.session.latest().map(|r| r.id), Some(1));
    }

    #[tokio::test]
    async fn test_open_article_and_back() {
        let (mut app, _backend) = app_with(FakeBackend::default());
        app.session.set_input("restart service");
        app.submit();
        app.settle().await;

        app.articles_nav_down();
        app.open_selected_article();
        assert_eq!(app.session.selected_article(), Some("journalctl-basics"));
        assert!(app.related_articles().is_empty());

        app.back();
        assert!(!app.showing_article());
        assert_eq!(app.related_articles().len(), 2);
        assert_eq!(app.session.latest().map(|r| r.id), Some(1));
    }

    #[tokio::test]
    async fn test_recall_history_entry() {
        let (mut app, _backend) = app_with(FakeBackend {
            history: vec![record(1, "disk full")],
            ..FakeBackend::default()
        });
        app.load_history();
        app.settle().await;
        app.input_mode = InputMode::Normal;
        app.focus = FocusPane::History;

        app.recall_selected_history();

        assert_eq!(app.session.input(), "disk full");
        assert_eq!(app.input_cursor, 9);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.focus, FocusPane::Input);
    }

    #[tokio::test]
    async fn test_toggle_history_clamps_selection() {
        let (mut app, _backend) = app_with(FakeBackend {
            history: (1..=5).map(|id| record(id, "q")).collect(),
            ..FakeBackend::default()
        });
        app.load_history();
        app.settle().await;

        app.toggle_history();
        assert_eq!(app.visible_history_len(), 5);
        app.history_state.select(Some(4));

        app.toggle_history();
        assert_eq!(app.visible_history_len(), 3);
        assert_eq!(app.history_state.selected(), Some(2));
    }

    #[tokio::test]
    async fn test_cycle_focus_skips_empty_panes() {
        let (mut app, _backend) = app_with(FakeBackend::default());
        app.cycle_focus();
        assert_eq!(app.focus, FocusPane::Input);

        app.session.set_input("q");
        app.submit();
        app.settle().await;

        app.cycle_focus();
        assert_eq!(app.focus, FocusPane::Articles);
        assert_eq!(app.input_mode, InputMode::Normal);
        app.cycle_focus();
        assert_eq!(app.focus, FocusPane::History);
        app.cycle_focus();
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
    }
}
