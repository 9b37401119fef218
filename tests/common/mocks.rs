//! Mock implementations for testing.
//!
//! Scripted stand-ins for the generation, search and scrape capabilities so
//! whole research runs can be exercised offline.

use async_trait::async_trait;
use deep_research::llm::LLMClient;
use deep_research::research::prompts;
use deep_research::tools::{PageScraper, SearchHit, WebSearch};
use deep_research::types::{AppError, Result};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Which research node a generation request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Planner,
    Summarizer,
    Reviewer,
    Writer,
    Evaluator,
}

impl Role {
    /// Nodes send their role prompt as the first message.
    fn detect(messages: &[(String, String)]) -> Option<Role> {
        let first = messages.first().map(|(_, content)| content.as_str())?;
        match first {
            p if p == prompts::QUERY_PLANNER_PROMPT => Some(Role::Planner),
            p if p == prompts::SUMMARIZER_PROMPT => Some(Role::Summarizer),
            p if p == prompts::REVIEWER_PROMPT => Some(Role::Reviewer),
            p if p == prompts::WRITER_PROMPT => Some(Role::Writer),
            p if p == prompts::EVALUATOR_PROMPT => Some(Role::Evaluator),
            _ => None,
        }
    }
}

/// Mock LLM client that answers per role from a script.
///
/// Each role has a list of replies consumed in order; the last one repeats.
/// `None` simulates a transport failure.
///
/// ```ignore
/// let llm = ScriptedLLM::healthy()
///     .always(Role::Reviewer, incomplete_review())
///     .failing(Role::Evaluator);
/// ```
pub struct ScriptedLLM {
    script: Mutex<HashMap<Role, Vec<Option<String>>>>,
    calls: Mutex<HashMap<Role, usize>>,
}

impl ScriptedLLM {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Every node gets a well-formed answer: three queries, a non-empty
    /// summary, a complete review, a confident draft and an evaluation
    /// favouring candidate 1.
    pub fn healthy() -> Self {
        Self::new()
            .always(Role::Planner, queries(&["alpha", "beta", "gamma"]))
            .always(Role::Summarizer, summary("Heat pumps keep a COP above 2 at -15C."))
            .always(Role::Reviewer, review(true, "The summaries cover the question."))
            .always(Role::Writer, draft("# Heat pumps\nThey work [Source: https://a]", 8))
            .always(Role::Evaluator, evaluation(&[18, 24, 24, 10, 5]))
    }

    pub fn always(self, role: Role, reply: String) -> Self {
        self.replies(role, vec![Some(reply)])
    }

    pub fn failing(self, role: Role) -> Self {
        self.replies(role, vec![None])
    }

    pub fn replies(self, role: Role, replies: Vec<Option<String>>) -> Self {
        self.script.lock().unwrap().insert(role, replies);
        self
    }

    pub fn calls(&self, role: Role) -> usize {
        self.calls.lock().unwrap().get(&role).copied().unwrap_or(0)
    }
}

impl Default for ScriptedLLM {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_history(&[("user".to_string(), prompt.to_string())])
            .await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_with_history(&[
            ("system".to_string(), system.to_string()),
            ("user".to_string(), prompt.to_string()),
        ])
        .await
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let role = Role::detect(messages)
            .ok_or_else(|| AppError::LLM("Mock received an unknown prompt".to_string()))?;

        let index = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(role).or_insert(0);
            *count += 1;
            *count - 1
        };

        let script = self.script.lock().unwrap();
        let reply = script
            .get(&role)
            .and_then(|replies| replies.get(index).or_else(|| replies.last()))
            .cloned()
            .flatten();

        reply.ok_or_else(|| AppError::LLM(format!("Mock {:?} failure", role)))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

// ============= Reply Builders =============

pub fn queries(items: &[&str]) -> String {
    let items: Vec<_> = items
        .iter()
        .map(|q| json!({ "query": q, "reason": format!("covers {}", q) }))
        .collect();
    json!({ "search_queries": items }).to_string()
}

pub fn summary(text: &str) -> String {
    json!({ "summary": text }).to_string()
}

pub fn review(is_complete: bool, justification: &str) -> String {
    json!({ "is_complete": is_complete, "justification": justification }).to_string()
}

pub fn draft(report: &str, confidence: u8) -> String {
    json!({ "report": report, "confidence": confidence }).to_string()
}

/// One evaluation entry per total, indexed from 0. Each total is spread as
/// evenly as possible over the five ratings.
pub fn evaluation(totals: &[u8]) -> String {
    let marks: Vec<_> = totals
        .iter()
        .enumerate()
        .map(|(index, total)| {
            let base = total / 5;
            let extra = total % 5;
            let rating = |i: u8| json!({ "score": base + u8::from(i < extra), "justification": "ok" });
            json!({
                "report_index": index,
                "faithfulness": rating(0),
                "answer_relevance": rating(1),
                "context_completeness": rating(2),
                "formatting_quality": rating(3),
                "synthesis_quality": rating(4),
            })
        })
        .collect();
    json!({ "marks": marks }).to_string()
}

// ============= Web Mocks =============

/// Mock search engine.
pub struct MockSearch {
    mode: SearchMode,
    delay: Option<Duration>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

enum SearchMode {
    /// `n` URLs derived from the query text
    PerQuery(usize),
    /// The same URLs for every query
    Fixed(Vec<String>),
    Failing,
}

impl MockSearch {
    pub fn per_query(n: usize) -> Self {
        Self::with_mode(SearchMode::PerQuery(n))
    }

    pub fn fixed(urls: &[&str]) -> Self {
        Self::with_mode(SearchMode::Fixed(urls.iter().map(|u| u.to_string()).collect()))
    }

    pub fn failing() -> Self {
        Self::with_mode(SearchMode::Failing)
    }

    fn with_mode(mode: SearchMode) -> Self {
        Self {
            mode,
            delay: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.mode {
            SearchMode::PerQuery(n) => Ok((0..*n)
                .map(|i| {
                    SearchHit::new(
                        format!("https://example.com/{}/{}", query.replace(' ', "-"), i),
                        "snippet",
                    )
                })
                .collect()),
            SearchMode::Fixed(urls) => Ok(urls
                .iter()
                .map(|url| SearchHit::new(url.clone(), "snippet"))
                .collect()),
            SearchMode::Failing => Err(AppError::Search("Mock search failure".to_string())),
        }
    }
}

/// Mock scraper returning a short page for every URL except the broken ones.
pub struct MockScraper {
    broken: HashSet<String>,
    calls: AtomicUsize,
}

impl MockScraper {
    pub fn new() -> Self {
        Self {
            broken: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_broken(urls: &[&str]) -> Self {
        Self {
            broken: urls.iter().map(|u| u.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn scrape(&self, url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(url) {
            return None;
        }
        Some(format!(
            "Page {} reports that modern heat pumps keep working in cold climates.",
            url
        ))
    }
}
