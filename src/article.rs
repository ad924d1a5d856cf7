//! Article detail content.
//!
//! The backend has no article endpoint yet. A future `GET /api/articles/:id`
//! is expected to return this shape; until it exists the detail view is
//! filled with [`ArticleContent::placeholder`], static templated text built
//! from the identifier. None of it is real knowledge-base data and the view
//! labels it as such.

use crate::format::humanize_identifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub id: String,
    pub title: String,
    pub category: String,
    pub read_minutes: u32,
    pub summary: String,
    pub sections: Vec<ArticleSection>,
}

impl ArticleContent {
    /// Synthesize demo content for `id`.
    pub fn placeholder(id: &str) -> Self {
        let title = humanize_identifier(id);
        let topic = title.to_lowercase();

        let sections = vec![
            ArticleSection {
                heading: "Overview".to_string(),
                body: format!(
                    "This article covers {}. It explains when the issue shows up, \
                     how to confirm it and which steps usually resolve it.",
                    topic
                ),
            },
            ArticleSection {
                heading: "Diagnosis".to_string(),
                body: format!(
                    "Check the relevant service and system logs for messages related to {}. \
                     Note the time of the first occurrence and any recent configuration changes.",
                    topic
                ),
            },
            ArticleSection {
                heading: "Resolution".to_string(),
                body: "Apply the documented fix in a test environment first, verify the \
                       outcome, then roll the change out and keep monitoring."
                    .to_string(),
            },
            ArticleSection {
                heading: "Related".to_string(),
                body: format!("Search the knowledge base for \"{}\" to find follow-up articles.", title),
            },
        ];

        Self {
            id: id.to_string(),
            title,
            category: "Knowledge Base".to_string(),
            read_minutes: 5,
            summary: format!("Step-by-step guidance for {}.", topic),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_title_is_humanized() {
        let article = ArticleContent::placeholder("ssl-handshake-failure");
        assert_eq!(article.id, "ssl-handshake-failure");
        assert_eq!(article.title, "Ssl Handshake Failure");
    }

    #[test]
    fn test_placeholder_references_identifier() {
        let article = ArticleContent::placeholder("systemd-service-restart");
        assert!(article.summary.contains("systemd service restart"));
        assert!(!article.sections.is_empty());
        assert!(article.sections[0].body.contains("systemd service restart"));
    }
}
