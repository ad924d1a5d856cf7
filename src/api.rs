use async_trait::async_trait;
use reqwest::Client;

use crate::error::{ApiError, Result};
use crate::record::{SearchQueryRequest, SearchRecord};

/// The two backend calls the client depends on.
///
/// `App` holds this behind an `Arc<dyn SearchBackend>` so the request tasks it
/// spawns can own a handle to the backend.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// `GET /api/search-queries`
    async fn list_search_queries(&self) -> Result<Vec<SearchRecord>>;

    /// `POST /api/search-query` with `{"query": <query>}`
    async fn create_search_query(&self, query: &str) -> Result<SearchRecord>;
}

#[derive(Clone)]
pub struct KnowledgeBaseClient {
    client: Client,
    base_url: String,
}

impl KnowledgeBaseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SearchBackend for KnowledgeBaseClient {
    async fn list_search_queries(&self) -> Result<Vec<SearchRecord>> {
        let url = format!("{}/api/search-queries", self.base_url);
        tracing::debug!(%url, "loading search history");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let records: Vec<SearchRecord> = response.json().await?;
        Ok(records)
    }

    async fn create_search_query(&self, query: &str) -> Result<SearchRecord> {
        let url = format!("{}/api/search-query", self.base_url);
        tracing::debug!(%url, "submitting search query");

        let request = SearchQueryRequest {
            query: query.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        let record: SearchRecord = response.json().await?;
        Ok(record)
    }
}
