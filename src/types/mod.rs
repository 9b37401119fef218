use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============= Research Records =============

/// A planned search query and the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QueryItem {
    /// The keyword-optimized search string.
    pub query: String,
    /// Justification for why this query was chosen.
    pub reason: String,
}

impl QueryItem {
    pub fn new(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            reason: reason.into(),
        }
    }
}

/// A scraped page. Content is empty when the scrape failed; the URL still
/// counts as seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub content: String,
}

/// Summary of one relevant snippet of a source.
///
/// An empty `summary` means the source was inspected but had nothing
/// relevant to the user query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub url: String,
    pub summary: String,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
    }
}

/// Outcome of one sufficiency judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewVerdict {
    /// True ONLY if the gathered information allows for a comprehensive,
    /// detailed answer to the user query. False if any specific detail is missing.
    pub is_complete: bool,
    /// If false, exactly what information is missing to guide the next search.
    /// If true, briefly why the data is sufficient.
    pub justification: String,
}

/// One drafted report. Created by a single drafting branch, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateReport {
    /// Markdown report with inline `[Source: URL]` citations
    pub report: String,
    /// Self-reported fidelity to the sources, 1-10
    pub confidence: u8,
}

/// A single rubric rating with its justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rating {
    /// Integer score from 1 (worst) to 10 (best).
    pub score: u8,
    /// One sentence explaining the score.
    pub justification: String,
}

/// Rubric scores for one candidate report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvaluationScore {
    /// The index number of the report being evaluated (e.g. 0, 1, 2, 3, 4).
    pub report_index: usize,
    /// Factual grounding. 10 = every claim is backed by the provided sources;
    /// 1 = the report fabricates or contradicts the sources.
    pub faithfulness: Rating,
    /// Intent matching. 10 = directly and completely answers the query;
    /// 1 = misses the point of the query.
    pub answer_relevance: Rating,
    /// Source utilization. 10 = includes all critical information and caveats;
    /// 1 = leaves out major context.
    pub context_completeness: Rating,
    /// Structure and readability. 10 = clean Markdown with logical headers;
    /// 1 = a disorganized wall of text.
    pub formatting_quality: Rating,
    /// Narrative cohesion. 10 = sources woven into one flowing narrative;
    /// 1 = a copy-pasted list of separate summaries.
    pub synthesis_quality: Rating,
}

impl EvaluationScore {
    pub fn ratings(&self) -> [&Rating; 5] {
        [
            &self.faithfulness,
            &self.answer_relevance,
            &self.context_completeness,
            &self.formatting_quality,
            &self.synthesis_quality,
        ]
    }

    /// Sum of the five rubric scores
    pub fn aggregate(&self) -> u32 {
        self.ratings().iter().map(|r| u32::from(r.score)).sum()
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Research run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, AppError>;
