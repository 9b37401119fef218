//! System prompts for the research nodes and helpers that assemble the
//! ordered instruction list sent with each structured call.

use chrono::Local;
use serde::Serialize;

use crate::types::{CandidateReport, Summary};

pub const QUERY_PLANNER_PROMPT: &str = r#"You are a search strategist preparing web research.
Given the user query, write 3 to 5 distinct, keyword-optimized search engine queries that together cover everything needed to answer it.
- Each query targets a different facet (definitions, recent events, figures, primary sources, counter-points).
- Prefer specific names, dates and terms over vague phrasing.
- If feedback about missing information is provided, focus the queries on filling those gaps.
- Give a one-sentence reason for every query."#;

pub const SUMMARIZER_PROMPT: &str = r#"You extract evidence from a web page snippet.
Write a concise extraction of the facts, dates and numbers in the snippet that directly help answer the user query.
- Use only what the snippet says. Do not add outside knowledge.
- If the snippet contains NO information relevant to the user query, the summary must be an empty string."#;

pub const REVIEWER_PROMPT: &str = r#"You are a research reviewer.
Decide whether the gathered summaries allow a comprehensive, detailed answer to the user query.
- Answer complete only if every important aspect of the query is covered by the summaries.
- If something is missing, say exactly what is missing so the next round of searches can find it.
- If the evidence is sufficient, briefly explain why."#;

pub const WRITER_PROMPT: &str = r#"You are a research writer.
Write a professional, well-structured report in Markdown that answers the user query in depth.
- Use ONLY the provided summaries. Never introduce facts that are not in them.
- Cite every fact inline as [Source: URL] using the URL of the summary it came from.
- Use headers and bullet points where they help readability.
- Rate your confidence from 1 to 10: 10 means you transcribed explicit facts with no interpretation, 1 means the sources were messy or incomplete and you had to infer or bridge gaps."#;

pub const EVALUATOR_PROMPT: &str = r#"You are an impartial judge of research reports.
Score every candidate report on five independent 1-10 scales, with one sentence of justification each:
- faithfulness: every claim is backed by the provided summaries, nothing fabricated.
- answer_relevance: directly and completely answers the user query without tangents.
- context_completeness: includes all critical information and caveats from the summaries.
- formatting_quality: clean Markdown with logical headers and good readability.
- synthesis_quality: weaves multiple sources into one coherent narrative.
Return one entry per report, using the report's index number."#;

pub fn current_date() -> String {
    format!(
        "[CURRENT DATE AND TIME]: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn user_query(query: &str) -> String {
    format!("[USER QUERY]: {}", query)
}

/// Summaries without relevant content are left out of the prompt.
pub fn summaries(summaries: &[Summary]) -> String {
    let relevant: Vec<&Summary> = summaries.iter().filter(|s| !s.is_empty()).collect();
    format!("[SUMMARIES]: {}", to_json(&relevant))
}

#[derive(Serialize)]
struct IndexedReport<'a> {
    index: usize,
    report: &'a str,
    confidence: u8,
}

/// Reports are labelled with their dispatch index, which is what the
/// evaluator refers back to.
pub fn reports(candidates: &[CandidateReport]) -> String {
    let indexed: Vec<IndexedReport<'_>> = candidates
        .iter()
        .enumerate()
        .map(|(index, c)| IndexedReport {
            index,
            report: &c.report,
            confidence: c.confidence,
        })
        .collect();
    format!("[REPORTS]: {}", to_json(&indexed))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries_skip_empty_entries() {
        let rendered = summaries(&[
            Summary {
                url: "https://a.example".to_string(),
                summary: "Founded in 1978.".to_string(),
            },
            Summary {
                url: "https://b.example".to_string(),
                summary: String::new(),
            },
        ]);

        assert!(rendered.starts_with("[SUMMARIES]: "));
        assert!(rendered.contains("https://a.example"));
        assert!(!rendered.contains("https://b.example"));
    }

    #[test]
    fn test_reports_carry_dispatch_index() {
        let rendered = reports(&[
            CandidateReport {
                report: "first".to_string(),
                confidence: 7,
            },
            CandidateReport {
                report: "second".to_string(),
                confidence: 9,
            },
        ]);

        assert!(rendered.contains(r#""index":0,"report":"first""#));
        assert!(rendered.contains(r#""index":1,"report":"second""#));
    }
}
