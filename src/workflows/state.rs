//! Shared state of one research run.
//!
//! Fields are private: the only way to change them is through the merge
//! methods below, which the orchestrator calls at its barriers. Accumulating
//! fields (`search_results`, `summaries`, `reports`) are appended to in
//! dispatch order and never shrink. Replacing fields (`search_queries`,
//! `review`) hold exactly the latest pass.

use std::collections::HashSet;

use serde::Serialize;

use crate::research::{PlanOutput, RetrievalDelta};
use crate::types::{AppError, CandidateReport, QueryItem, Result, ReviewVerdict, SearchResult, Summary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowState {
    user_query: String,
    search_queries: Vec<QueryItem>,
    search_results: Vec<SearchResult>,
    summaries: Vec<Summary>,
    review: Option<ReviewVerdict>,
    reports: Vec<CandidateReport>,
    final_report: Option<String>,
    search_iteration: u32,
}

impl WorkflowState {
    pub fn new(user_query: impl Into<String>) -> Result<Self> {
        let user_query = user_query.into();
        if user_query.trim().is_empty() {
            return Err(AppError::InvalidInput("Query cannot be empty".to_string()));
        }
        Ok(Self {
            user_query,
            search_queries: Vec::new(),
            search_results: Vec::new(),
            summaries: Vec::new(),
            review: None,
            reports: Vec::new(),
            final_report: None,
            search_iteration: 0,
        })
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn search_queries(&self) -> &[QueryItem] {
        &self.search_queries
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    pub fn review(&self) -> Option<&ReviewVerdict> {
        self.review.as_ref()
    }

    pub fn reports(&self) -> &[CandidateReport] {
        &self.reports
    }

    pub fn final_report(&self) -> Option<&str> {
        self.final_report.as_deref()
    }

    pub fn search_iteration(&self) -> u32 {
        self.search_iteration
    }

    /// URLs merged so far; what retrieval branches of the next fan-out skip.
    pub fn seen_urls(&self) -> HashSet<String> {
        self.search_results.iter().map(|r| r.url.clone()).collect()
    }

    /// Replace the query set and advance the iteration counter.
    pub fn apply_plan(&mut self, plan: PlanOutput) -> Result<()> {
        if plan.iteration != self.search_iteration + 1 {
            return Err(AppError::Internal(format!(
                "Plan for iteration {} applied at iteration {}",
                plan.iteration, self.search_iteration
            )));
        }
        self.search_queries = plan.queries;
        self.search_iteration = plan.iteration;
        Ok(())
    }

    /// Append the retrieval deltas in dispatch order. Search results whose
    /// URL is already present are dropped; summaries are kept as returned.
    pub fn merge_retrievals(&mut self, deltas: Vec<RetrievalDelta>) {
        let mut seen = self.seen_urls();
        for delta in deltas {
            for result in delta.search_results {
                if seen.insert(result.url.clone()) {
                    self.search_results.push(result);
                }
            }
            self.summaries.extend(delta.summaries);
        }
    }

    pub fn apply_review(&mut self, verdict: ReviewVerdict) {
        self.review = Some(verdict);
    }

    pub fn merge_drafts(&mut self, drafts: Vec<CandidateReport>) {
        self.reports.extend(drafts);
    }

    pub fn set_final_report(&mut self, report: String) -> Result<()> {
        if self.final_report.is_some() {
            return Err(AppError::Internal(
                "Final report already written".to_string(),
            ));
        }
        self.final_report = Some(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            content: format!("content of {}", url),
        }
    }

    fn summary(url: &str, text: &str) -> Summary {
        Summary {
            url: url.to_string(),
            summary: text.to_string(),
        }
    }

    fn plan(iteration: u32, queries: &[&str]) -> PlanOutput {
        PlanOutput {
            queries: queries.iter().map(|q| QueryItem::new(*q, "r")).collect(),
            iteration,
        }
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(
            WorkflowState::new("  "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_plan_replaces_queries() {
        let mut state = WorkflowState::new("q").unwrap();
        state.apply_plan(plan(1, &["a", "b", "c"])).unwrap();
        state.apply_plan(plan(2, &["d", "e", "f"])).unwrap();

        let queries: Vec<&str> = state.search_queries().iter().map(|q| q.query.as_str()).collect();
        assert_eq!(queries, vec!["d", "e", "f"]);
        assert_eq!(state.search_iteration(), 2);
    }

    #[test]
    fn test_plan_must_advance_by_one() {
        let mut state = WorkflowState::new("q").unwrap();
        assert!(matches!(
            state.apply_plan(plan(2, &["a"])),
            Err(AppError::Internal(_))
        ));
        assert_eq!(state.search_iteration(), 0);
    }

    #[test]
    fn test_retrieval_merge_appends_and_dedupes_urls() {
        let mut state = WorkflowState::new("q").unwrap();
        state.merge_retrievals(vec![
            RetrievalDelta {
                summaries: vec![summary("https://a", "one")],
                search_results: vec![page("https://a")],
            },
            RetrievalDelta {
                summaries: vec![summary("https://a", "two"), summary("https://b", "three")],
                search_results: vec![page("https://a"), page("https://b")],
            },
        ]);

        assert_eq!(state.search_results().len(), 2);
        assert_eq!(state.summaries().len(), 3);
        assert_eq!(state.summaries()[0].summary, "one");

        state.merge_retrievals(vec![RetrievalDelta::default()]);
        assert_eq!(state.search_results().len(), 2);
        assert_eq!(state.summaries().len(), 3);
        assert!(state.seen_urls().contains("https://b"));
    }

    #[test]
    fn test_review_replaced_each_pass() {
        let mut state = WorkflowState::new("q").unwrap();
        state.apply_review(ReviewVerdict {
            is_complete: false,
            justification: "first".to_string(),
        });
        state.apply_review(ReviewVerdict {
            is_complete: true,
            justification: "second".to_string(),
        });
        assert_eq!(state.review().map(|r| r.justification.as_str()), Some("second"));
    }

    #[test]
    fn test_final_report_written_once() {
        let mut state = WorkflowState::new("q").unwrap();
        state.merge_drafts(vec![CandidateReport {
            report: "r".to_string(),
            confidence: 5,
        }]);
        state.set_final_report("r".to_string()).unwrap();
        assert!(state.set_final_report("again".to_string()).is_err());
        assert_eq!(state.final_report(), Some("r"));
    }
}
