//! Rubric-based selection of the final report.
//!
//! One evaluation call scores every candidate on five 1-10 criteria. The
//! candidate with the highest sum wins; ties go to the earliest candidate.
//! If the evaluation cannot be obtained, or none of its entries refers to an
//! existing candidate, the first candidate is used.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::llm::{StructuredCaller, StructuredOutput};
use crate::research::prompts;
use crate::types::{AppError, CandidateReport, EvaluationScore, Result, Summary};

/// Model output for one evaluation
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Evaluation {
    /// One entry per candidate report.
    pub marks: Vec<EvaluationScore>,
}

impl StructuredOutput for Evaluation {
    fn validate(&self) -> Result<()> {
        if self.marks.is_empty() {
            return Err(AppError::InvalidInput("no evaluation entries".to_string()));
        }
        for mark in &self.marks {
            for rating in mark.ratings() {
                if !(1..=10).contains(&rating.score) {
                    return Err(AppError::InvalidInput(format!(
                        "report {}: score {} outside 1-10",
                        mark.report_index, rating.score
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The chosen report and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub report: String,
    /// Aggregate per candidate, `None` where the evaluation had no entry
    pub aggregates: Vec<Option<u32>>,
    /// True when no usable evaluation was available and index 0 was taken
    pub fell_back: bool,
}

/// Per-candidate aggregate for `n` candidates. Entries pointing outside the
/// candidate list are ignored, as are repeated entries for the same index.
pub fn aggregates(marks: &[EvaluationScore], n: usize) -> Vec<Option<u32>> {
    let mut totals = vec![None; n];
    let mut seen = HashSet::new();
    for mark in marks {
        if mark.report_index < n && seen.insert(mark.report_index) {
            totals[mark.report_index] = Some(mark.aggregate());
        }
    }
    totals
}

/// Index of the highest aggregate, lowest index on ties.
pub fn best_candidate(marks: &[EvaluationScore], n: usize) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, total) in aggregates(marks, n).into_iter().enumerate() {
        if let Some(total) = total {
            match best {
                Some((_, top)) if total <= top => {}
                _ => best = Some((index, total)),
            }
        }
    }
    best.map(|(index, _)| index)
}

pub struct Selector {
    caller: StructuredCaller,
}

impl Selector {
    pub fn new(caller: StructuredCaller) -> Self {
        Self { caller }
    }

    /// # Errors
    ///
    /// Fails only when there are no candidates to choose from.
    pub async fn select(
        &self,
        user_query: &str,
        summaries: &[Summary],
        candidates: &[CandidateReport],
    ) -> Result<Selection> {
        tracing::info!(candidates = candidates.len(), "Entered in the 'evaluate' node");

        if candidates.is_empty() {
            return Err(AppError::Internal(
                "No candidate reports to evaluate".to_string(),
            ));
        }

        let prompt = vec![
            prompts::EVALUATOR_PROMPT.to_string(),
            prompts::current_date(),
            prompts::user_query(user_query),
            prompts::summaries(summaries),
            prompts::reports(candidates),
        ];

        let marks = self
            .caller
            .try_call::<Evaluation>(&prompt)
            .await
            .ok()
            .map(|e| e.marks)
            .unwrap_or_default();

        let totals = aggregates(&marks, candidates.len());
        let (index, fell_back) = match best_candidate(&marks, candidates.len()) {
            Some(index) => (index, false),
            None => {
                tracing::warn!("Evaluation unavailable, selecting the first report");
                (0, true)
            }
        };

        tracing::info!(index, ?totals, "best report selected");
        Ok(Selection {
            index,
            report: candidates[index].report.clone(),
            aggregates: totals,
            fell_back,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;
    use rstest::rstest;

    fn rating(score: u8) -> Rating {
        Rating {
            score,
            justification: "ok".to_string(),
        }
    }

    /// Spread `total` over five ratings
    fn mark(report_index: usize, total: u8) -> EvaluationScore {
        let base = total / 5;
        let extra = total % 5;
        let s = |i: u8| rating(base + u8::from(i < extra));
        EvaluationScore {
            report_index,
            faithfulness: s(0),
            answer_relevance: s(1),
            context_completeness: s(2),
            formatting_quality: s(3),
            synthesis_quality: s(4),
        }
    }

    fn marks(totals: &[u8]) -> Vec<EvaluationScore> {
        totals.iter().enumerate().map(|(i, t)| mark(i, *t)).collect()
    }

    #[rstest]
    #[case(&[18, 24, 24, 10, 5], Some(1))]
    #[case(&[30, 20, 10], Some(0))]
    #[case(&[10, 10, 40], Some(2))]
    #[case(&[25, 25, 25, 25, 25], Some(0))]
    #[case(&[], None)]
    fn test_best_candidate(#[case] totals: &[u8], #[case] expected: Option<usize>) {
        let n = totals.len().max(1);
        assert_eq!(best_candidate(&marks(totals), n), expected);
    }

    #[test]
    fn test_out_of_range_and_duplicate_indices_ignored() {
        let scored = vec![mark(7, 50), mark(1, 20), mark(1, 45), mark(0, 15)];
        assert_eq!(aggregates(&scored, 2), vec![Some(15), Some(20)]);
        assert_eq!(best_candidate(&scored, 2), Some(1));
    }

    #[test]
    fn test_only_invalid_indices_yields_none() {
        assert_eq!(best_candidate(&[mark(5, 40)], 5), None);
    }

    #[test]
    fn test_evaluation_rejects_scores_outside_range() {
        let mut bad = mark(0, 25);
        bad.formatting_quality = rating(0);
        let eval = Evaluation { marks: vec![bad] };
        assert!(eval.validate().is_err());

        let good = Evaluation {
            marks: marks(&[25, 30]),
        };
        assert!(good.validate().is_ok());
    }
}
