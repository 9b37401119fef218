use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::llm::{StructuredCaller, StructuredOutput};
use crate::rag::{chunker::TextChunker, ranker::build_corpus, Passage, RelevanceRanker};
use crate::research::prompts;
use crate::tools::{PageScraper, WebSearch};
use crate::types::{SearchResult, Summary};

/// Model output for one snippet
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SnippetSummary {
    /// A concise extraction of facts, dates, and numbers from the text that
    /// directly answer the user query. If the text contains NO relevant
    /// information, this must be an empty string.
    pub summary: String,
}

impl StructuredOutput for SnippetSummary {}

/// What one retrieval branch hands back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalDelta {
    pub summaries: Vec<Summary>,
    pub search_results: Vec<SearchResult>,
}

impl RetrievalDelta {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty() && self.search_results.is_empty()
    }
}

/// Search, scrape, rank and summarize for a single search query.
pub struct Retriever {
    caller: StructuredCaller,
    search: Arc<dyn WebSearch>,
    scraper: Arc<dyn PageScraper>,
    ranker: Arc<dyn RelevanceRanker>,
    chunker: TextChunker,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        caller: StructuredCaller,
        search: Arc<dyn WebSearch>,
        scraper: Arc<dyn PageScraper>,
        ranker: Arc<dyn RelevanceRanker>,
        chunker: TextChunker,
        top_k: usize,
    ) -> Self {
        Self {
            caller,
            search,
            scraper,
            ranker,
            chunker,
            top_k,
        }
    }

    /// `already_seen` holds the URLs merged from earlier iterations only;
    /// sibling branches of the same fan-out may return the same URL.
    pub async fn retrieve(
        &self,
        user_query: &str,
        search_query: &str,
        already_seen: &HashSet<String>,
    ) -> RetrievalDelta {
        tracing::info!(search_query, "Entered in the 'search' node");

        if search_query.trim().is_empty() {
            tracing::warn!("Skipping blank search query");
            return RetrievalDelta::default();
        }

        let hits = match self.search.search(search_query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(search_query, error = %e, "Search failed");
                return RetrievalDelta::default();
            }
        };

        let mut new_urls: Vec<String> = Vec::new();
        for hit in hits {
            if !already_seen.contains(&hit.url) && !new_urls.contains(&hit.url) {
                new_urls.push(hit.url);
            }
        }

        if new_urls.is_empty() {
            tracing::warn!(search_query, "No new content found for query");
            return RetrievalDelta::default();
        }

        let contents = join_all(new_urls.iter().map(|url| self.scraper.scrape(url))).await;
        let search_results: Vec<SearchResult> = new_urls
            .into_iter()
            .zip(contents)
            .map(|(url, content)| {
                if content.is_none() {
                    tracing::warn!(url = %url, "Skipping page that could not be scraped");
                }
                SearchResult {
                    url,
                    content: content.unwrap_or_default(),
                }
            })
            .collect();

        let corpus = build_corpus(&search_results, &self.chunker);
        if corpus.is_empty() {
            tracing::warn!(search_query, "Scraped pages contain no text");
            return RetrievalDelta {
                summaries: Vec::new(),
                search_results,
            };
        }

        let snippets = match self.ranker.top_k(user_query, corpus, self.top_k).await {
            Ok(snippets) => snippets,
            Err(e) => {
                tracing::warn!(search_query, error = %e, "Relevance ranking failed");
                Vec::new()
            }
        };

        let mut summaries = Vec::with_capacity(snippets.len());
        for snippet in &snippets {
            summaries.push(self.summarize(user_query, snippet).await);
        }

        tracing::info!(
            search_query,
            pages = search_results.len(),
            summaries = summaries.len(),
            "search results"
        );
        RetrievalDelta {
            summaries,
            search_results,
        }
    }

    async fn summarize(&self, user_query: &str, snippet: &Passage) -> Summary {
        let prompt = vec![
            prompts::SUMMARIZER_PROMPT.to_string(),
            prompts::current_date(),
            prompts::user_query(user_query),
            format!("[URL]: {}", snippet.url),
            format!("[PAGE SNIPPET]: {}", snippet.text),
        ];
        let fallback = SnippetSummary {
            summary: String::new(),
        };

        let summary = self.caller.call(&prompt, fallback).await.summary;
        Summary {
            url: snippet.url.clone(),
            summary,
        }
    }
}
