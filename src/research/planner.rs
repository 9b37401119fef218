use std::collections::HashSet;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::llm::{StructuredCaller, StructuredOutput};
use crate::research::prompts;
use crate::types::{AppError, QueryItem, Result};

/// Bounds on how many queries one planning pass may produce
pub const MIN_QUERIES: usize = 3;
pub const MAX_QUERIES: usize = 5;

/// Model output for one planning pass
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GeneratedQueries {
    /// A list of 3 to 5 distinct search queries with justifications.
    pub search_queries: Vec<QueryItem>,
}

impl StructuredOutput for GeneratedQueries {
    /// Drops blank and repeated queries, then keeps the first `MAX_QUERIES`.
    fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.search_queries.retain(|item| {
            let normalized = item.query.trim().to_lowercase();
            !normalized.is_empty() && seen.insert(normalized)
        });
        self.search_queries.truncate(MAX_QUERIES);
    }

    fn validate(&self) -> Result<()> {
        let count = self.search_queries.len();
        if !(MIN_QUERIES..=MAX_QUERIES).contains(&count) {
            return Err(AppError::InvalidInput(format!(
                "expected {}-{} search queries, got {}",
                MIN_QUERIES, MAX_QUERIES, count
            )));
        }

        let mut seen = HashSet::new();
        for item in &self.search_queries {
            let normalized = item.query.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(AppError::InvalidInput("blank search query".to_string()));
            }
            if !seen.insert(normalized) {
                return Err(AppError::InvalidInput(format!(
                    "duplicate search query '{}'",
                    item.query
                )));
            }
        }
        Ok(())
    }
}

/// Result of one planning pass: the queries replace the previous pass's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutput {
    pub queries: Vec<QueryItem>,
    pub iteration: u32,
}

/// Placeholder query returned when generation fails, so the search fan-out
/// always has a branch to run.
pub fn failure_sentinel() -> QueryItem {
    QueryItem::new("", "The query generation has failed.")
}

pub fn is_failure_sentinel(item: &QueryItem) -> bool {
    item.query.trim().is_empty()
}

pub struct QueryPlanner {
    caller: StructuredCaller,
}

impl QueryPlanner {
    pub fn new(caller: StructuredCaller) -> Self {
        Self { caller }
    }

    pub async fn plan(&self, user_query: &str, prior_iteration: u32) -> PlanOutput {
        self.plan_with_feedback(user_query, prior_iteration, None)
            .await
    }

    /// Plan the next pass. `feedback` is the reviewer's note on what is
    /// still missing, when a previous pass was judged insufficient.
    pub async fn plan_with_feedback(
        &self,
        user_query: &str,
        prior_iteration: u32,
        feedback: Option<&str>,
    ) -> PlanOutput {
        tracing::info!("Entered in the 'generate_queries' node");
        let iteration = prior_iteration + 1;

        let mut prompt = vec![
            prompts::QUERY_PLANNER_PROMPT.to_string(),
            prompts::user_query(user_query),
            prompts::current_date(),
            format!("[SEARCH ITERATION]: {}", iteration),
        ];
        if let Some(missing) = feedback {
            prompt.push(format!("[REVIEWER FEEDBACK]: {}", missing));
        }

        let fallback = GeneratedQueries {
            search_queries: vec![failure_sentinel()],
        };
        let queries = self.caller.call(&prompt, fallback).await.search_queries;

        tracing::info!(iteration, ?queries, "search_queries");
        PlanOutput { queries, iteration }
    }
}
