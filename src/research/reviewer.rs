use crate::llm::{StructuredCaller, StructuredOutput};
use crate::research::prompts;
use crate::types::{ReviewVerdict, Summary};

impl StructuredOutput for ReviewVerdict {}

pub const ITERATION_CAP_NOTE: &str = "Maximum search iteration reached. ";

/// Decides whether the evidence gathered so far answers the user query.
pub struct ReviewGate {
    caller: StructuredCaller,
    max_iterations: u32,
}

impl ReviewGate {
    pub fn new(caller: StructuredCaller, max_iterations: u32) -> Self {
        Self {
            caller,
            max_iterations,
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub async fn review(
        &self,
        user_query: &str,
        summaries: &[Summary],
        iteration: u32,
    ) -> ReviewVerdict {
        tracing::info!(iteration, "Entered in the 'review' node");

        let prompt = vec![
            prompts::REVIEWER_PROMPT.to_string(),
            prompts::current_date(),
            prompts::user_query(user_query),
            prompts::summaries(summaries),
            format!("[SEARCH ITERATION]: {}", iteration),
        ];
        let fallback = ReviewVerdict {
            is_complete: false,
            justification: "An error occurred during review.".to_string(),
        };

        let verdict = apply_iteration_cap(
            self.caller.call(&prompt, fallback).await,
            iteration,
            self.max_iterations,
        );

        tracing::info!(is_complete = verdict.is_complete, justification = %verdict.justification, "review");
        verdict
    }
}

/// Once `iteration` reaches `cap` the verdict is complete no matter what the
/// model said.
pub fn apply_iteration_cap(verdict: ReviewVerdict, iteration: u32, cap: u32) -> ReviewVerdict {
    if iteration >= cap {
        ReviewVerdict {
            is_complete: true,
            justification: format!("{}{}", ITERATION_CAP_NOTE, verdict.justification),
        }
    } else {
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incomplete() -> ReviewVerdict {
        ReviewVerdict {
            is_complete: false,
            justification: "Missing 2024 figures.".to_string(),
        }
    }

    #[test]
    fn test_below_cap_keeps_model_verdict() {
        assert_eq!(apply_iteration_cap(incomplete(), 2, 3), incomplete());
    }

    #[test]
    fn test_cap_forces_completion() {
        let verdict = apply_iteration_cap(incomplete(), 3, 3);
        assert!(verdict.is_complete);
        assert_eq!(
            verdict.justification,
            "Maximum search iteration reached. Missing 2024 figures."
        );
    }

    #[test]
    fn test_forced_verdict_is_stable() {
        for iteration in [3, 4, 10] {
            assert!(apply_iteration_cap(incomplete(), iteration, 3).is_complete);
        }
    }
}
