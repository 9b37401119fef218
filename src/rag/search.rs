//! BM25 lexical search over an in-memory set of snippets.
//!
//! The index is rebuilt for every retrieval branch (one per search query), so
//! it stays small and lives only as long as the branch. Documents are
//! addressed by insertion position.

use std::collections::HashMap;

/// Standard BM25 term-frequency saturation
const K1: f32 = 1.2;
/// Standard BM25 length normalization
const B: f32 = 0.75;

#[derive(Debug, Clone)]
struct IndexedDoc {
    term_counts: HashMap<String, usize>,
    len: usize,
}

/// BM25 search index for lexical matching
#[derive(Debug, Clone, Default)]
pub struct Bm25Index {
    docs: Vec<IndexedDoc>,
    /// Term -> positions of the documents containing it
    postings: HashMap<String, Vec<usize>>,
    total_len: usize,
}

impl Bm25Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every text in order; positions match the input.
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::new();
        for text in texts {
            index.add_document(text);
        }
        index
    }

    /// Lowercased alphanumeric terms of two or more characters
    fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.chars().count() > 1)
            .map(str::to_lowercase)
    }

    /// Add a document and return its position.
    pub fn add_document(&mut self, content: &str) -> usize {
        let position = self.docs.len();
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut len = 0;
        for term in Self::tokenize(content) {
            *term_counts.entry(term).or_insert(0) += 1;
            len += 1;
        }

        for term in term_counts.keys() {
            self.postings.entry(term.clone()).or_default().push(position);
        }
        self.total_len += len;
        self.docs.push(IndexedDoc { term_counts, len });
        position
    }

    fn idf(&self, term: &str) -> f32 {
        let df = self.postings.get(term).map_or(0, Vec::len) as f32;
        if df == 0.0 {
            return 0.0;
        }
        let n = self.docs.len() as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, doc: &IndexedDoc, query_terms: &[(String, f32)], avg_len: f32) -> f32 {
        query_terms
            .iter()
            .map(|(term, idf)| {
                let tf = doc.term_counts.get(term).copied().unwrap_or(0) as f32;
                let norm = K1 * (1.0 - B + B * doc.len as f32 / avg_len);
                idf * tf * (K1 + 1.0) / (tf + norm)
            })
            .sum()
    }

    /// Top-k `(position, score)` pairs for documents sharing at least one
    /// term with the query, best first. Equal scores keep insertion order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<(usize, f32)> {
        let mut query_terms: Vec<String> = Self::tokenize(query).collect();
        query_terms.sort();
        query_terms.dedup();
        if query_terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let weighted: Vec<(String, f32)> = query_terms
            .into_iter()
            .map(|term| {
                let idf = self.idf(&term);
                (term, idf)
            })
            .collect();

        let mut candidates: Vec<usize> = weighted
            .iter()
            .filter_map(|(term, _)| self.postings.get(term))
            .flatten()
            .copied()
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let avg_len = (self.total_len as f32 / self.docs.len() as f32).max(1.0);
        let mut results: Vec<(usize, f32)> = candidates
            .into_iter()
            .map(|position| (position, self.score(&self.docs[position], &weighted, avg_len)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        results.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        results.truncate(top_k);
        results
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
