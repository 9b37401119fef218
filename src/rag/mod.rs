//! Snippet selection for the retrieval step
//!
//! Scraped pages are far too long to summarize whole, so each retrieval branch
//! narrows them down to the few passages most relevant to the user query.
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Splits page text into fixed-size snippets
//! - [`rag::search`](crate::rag::search) - BM25 lexical index
//! - [`rag::ranker`](crate::rag::ranker) - The relevance ranking capability and its BM25 implementation
//!
//! # Example
//!
//! ```ignore
//! use deep_research::rag::{chunker::TextChunker, ranker::{build_corpus, Bm25Ranker, RelevanceRanker}};
//!
//! let corpus = build_corpus(&pages, &TextChunker::new(5000, 0));
//! let snippets = Bm25Ranker.top_k(&user_query, corpus, 3).await?;
//! ```

pub mod chunker;
pub mod ranker;
pub mod search;

pub use ranker::{Bm25Ranker, Passage, RelevanceRanker};
