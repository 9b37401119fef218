//! Web search and page scraping
//!
//! The research workflow consumes two capabilities: a search engine that maps
//! a query to ranked `(url, snippet)` hits, and a scraper that turns a URL into
//! page text. Both sit behind traits so retrieval can be tested offline;
//! [`DaedraWeb`] implements them with the daedra crate (DuckDuckGo search and
//! page-to-markdown fetching).

use crate::types::{AppError, Result};
use async_trait::async_trait;

/// A single hit from the search engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Query -> ordered hits
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// URL -> full page text, `None` when the page could not be fetched
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Option<String>;
}

/// Search and fetch powered by daedra
#[derive(Debug, Clone)]
pub struct DaedraWeb {
    num_results: usize,
}

impl DaedraWeb {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl Default for DaedraWeb {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl WebSearch for DaedraWeb {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Empty search query".to_string()));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.num_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .map(|r| SearchHit::new(r.url.clone(), r.description.clone()))
            .collect())
    }
}

#[async_trait]
impl PageScraper for DaedraWeb {
    async fn scrape(&self, url: &str) -> Option<String> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        match daedra::tools::fetch::fetch_page(&fetch_args).await {
            Ok(page_content) => Some(page_content.content),
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to fetch page");
                None
            }
        }
    }
}
