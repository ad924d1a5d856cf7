//! Terminal client for an AI-summarized knowledge-base search backend.
//!
//! The backend exposes two calls: list past searches and create a new one.
//! Everything else (answer display, article drill-down, history sidebar) is
//! client-side state in [`session::SessionState`], rendered through the views
//! in [`view`].

pub mod api;
pub mod app;
pub mod article;
pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod logging;
pub mod record;
pub mod session;
pub mod tui;
pub mod ui;
pub mod view;

// Re-export main types for convenience
pub use api::{KnowledgeBaseClient, SearchBackend};
pub use app::App;
pub use article::ArticleContent;
pub use config::Config;
pub use error::ApiError;
pub use format::{extract_query_text, humanize_identifier, QueryPayload};
pub use record::SearchRecord;
pub use session::SessionState;
