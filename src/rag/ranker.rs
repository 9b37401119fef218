//! Relevance ranking of scraped page snippets.

use async_trait::async_trait;

use crate::rag::{chunker::TextChunker, search::Bm25Index};
use crate::types::{Result, SearchResult};

/// A chunk of page text with its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub url: String,
    pub text: String,
}

impl Passage {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
        }
    }
}

/// Picks the `k` passages most relevant to a query.
#[async_trait]
pub trait RelevanceRanker: Send + Sync {
    async fn top_k(&self, query: &str, corpus: Vec<Passage>, k: usize) -> Result<Vec<Passage>>;
}

/// Split scraped pages into passages. Pages with empty content yield nothing.
pub fn build_corpus(pages: &[SearchResult], chunker: &TextChunker) -> Vec<Passage> {
    pages
        .iter()
        .flat_map(|page| {
            chunker
                .chunk(&page.content)
                .into_iter()
                .map(move |text| Passage::new(page.url.clone(), text))
        })
        .collect()
}

/// BM25 ranking. Lexical matching can leave fewer than `k` hits; the
/// remaining slots are filled with unmatched passages in corpus order.
#[derive(Debug, Clone, Default)]
pub struct Bm25Ranker;

#[async_trait]
impl RelevanceRanker for Bm25Ranker {
    async fn top_k(&self, query: &str, corpus: Vec<Passage>, k: usize) -> Result<Vec<Passage>> {
        let index = Bm25Index::from_texts(corpus.iter().map(|p| p.text.as_str()));
        let mut picked: Vec<usize> = index
            .search(query, k)
            .into_iter()
            .map(|(position, _)| position)
            .collect();

        for i in 0..corpus.len() {
            if picked.len() >= k {
                break;
            }
            if !picked.contains(&i) {
                picked.push(i);
            }
        }

        Ok(picked
            .into_iter()
            .filter_map(|i| corpus.get(i).cloned())
            .collect())
    }
}
