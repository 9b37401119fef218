use schemars::JsonSchema;
use serde::Deserialize;

use crate::llm::{StructuredCaller, StructuredOutput};
use crate::research::prompts;
use crate::types::{AppError, CandidateReport, Result, Summary};

pub const DRAFT_FAILURE_REPORT: &str =
    "Report generation failed: the writing model did not produce a valid report.";

/// Model output for one draft
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DraftedReport {
    /// The full report in Markdown, citing every fact inline as [Source: URL].
    pub report: String,
    /// Integer from 1 to 10. 10 = explicit facts transcribed with no
    /// interpretation; 1 = the sources were messy and gaps had to be bridged.
    pub confidence: u8,
}

impl StructuredOutput for DraftedReport {
    fn validate(&self) -> Result<()> {
        if self.report.trim().is_empty() {
            return Err(AppError::InvalidInput("empty report".to_string()));
        }
        if !(1..=10).contains(&self.confidence) {
            return Err(AppError::InvalidInput(format!(
                "confidence {} outside 1-10",
                self.confidence
            )));
        }
        Ok(())
    }
}

impl From<DraftedReport> for CandidateReport {
    fn from(d: DraftedReport) -> Self {
        CandidateReport {
            report: d.report,
            confidence: d.confidence,
        }
    }
}

/// Writes one candidate report from the accumulated summaries.
pub struct Drafter {
    caller: StructuredCaller,
}

impl Drafter {
    pub fn new(caller: StructuredCaller) -> Self {
        Self { caller }
    }

    pub async fn draft(&self, user_query: &str, summaries: &[Summary]) -> CandidateReport {
        tracing::info!("Entered in the 'write' node");

        let prompt = vec![
            prompts::WRITER_PROMPT.to_string(),
            prompts::current_date(),
            prompts::user_query(user_query),
            prompts::summaries(summaries),
        ];
        let fallback = DraftedReport {
            report: DRAFT_FAILURE_REPORT.to_string(),
            confidence: 1,
        };

        let report: CandidateReport = self.caller.call(&prompt, fallback).await.into();
        tracing::info!(confidence = report.confidence, "draft written");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_confidence_range() {
        let mut draft = DraftedReport {
            report: "# Findings".to_string(),
            confidence: 8,
        };
        assert!(draft.validate().is_ok());

        draft.confidence = 0;
        assert!(draft.validate().is_err());

        draft.confidence = 11;
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_report() {
        let draft = DraftedReport {
            report: "  \n".to_string(),
            confidence: 5,
        };
        assert!(draft.validate().is_err());
    }
}
