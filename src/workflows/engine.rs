//! Research Workflow Engine
//!
//! Drives one run through `PLAN -> SEARCH -> REVIEW -> {PLAN | DRAFT} ->
//! EVALUATE -> DONE`. SEARCH and DRAFT are fan-out/fan-in barriers: every
//! dispatched branch finishes before the engine merges their deltas into the
//! [`WorkflowState`] and moves on. Branch tasks never touch the state.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::llm::{LLMClient, StructuredCaller};
use crate::rag::{chunker::TextChunker, Bm25Ranker, RelevanceRanker};
use crate::research::{Drafter, QueryPlanner, ReviewGate, Retriever, Selection, Selector};
use crate::tools::{DaedraWeb, PageScraper, WebSearch};
use crate::types::{AppError, Result, Summary};
use crate::utils::toml_config::{DeepResearchConfig, ResearchConfig};
use crate::workflows::events::{ProgressEvent, ProgressSink};
use crate::workflows::fanout::{fan_out, DispatchSet};
use crate::workflows::state::WorkflowState;

/// Orchestrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Plan,
    Search,
    Review,
    Draft,
    Evaluate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Plan => "plan",
            Stage::Search => "search",
            Stage::Review => "review",
            Stage::Draft => "draft",
            Stage::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

/// A single executed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStep {
    pub stage: Stage,
    /// Short description of what the stage produced
    pub detail: String,
    /// Unix timestamp when the stage started
    pub timestamp: i64,
    /// Duration of this stage in milliseconds
    pub duration_ms: u64,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub run_id: Uuid,
    pub state: WorkflowState,
    pub selection: Selection,
    /// Executed stages, in order
    pub steps: Vec<WorkflowStep>,
}

impl ResearchOutcome {
    pub fn report(&self) -> &str {
        &self.selection.report
    }
}

/// The research orchestrator
pub struct ResearchWorkflow {
    planner: QueryPlanner,
    retriever: Arc<Retriever>,
    reviewer: ReviewGate,
    drafter: Arc<Drafter>,
    selector: Selector,
    draft_count: usize,
    progress: ProgressSink,
}

impl ResearchWorkflow {
    pub fn builder() -> ResearchWorkflowBuilder {
        ResearchWorkflowBuilder::default()
    }

    /// Build a workflow from a loaded configuration, creating the provider
    /// clients and the daedra web backend.
    pub async fn from_config(config: &DeepResearchConfig) -> Result<Self> {
        ResearchWorkflowBuilder::from_config(config).await?.build()
    }

    pub fn draft_count(&self) -> usize {
        self.draft_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.reviewer.max_iterations()
    }

    /// Run to completion and return the final report.
    pub async fn run(&self, query: &str) -> Result<String> {
        self.run_with_cancel(query, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but stops with [`AppError::Cancelled`] as
    /// soon as `cancel` fires.
    pub async fn run_with_cancel(&self, query: &str, cancel: CancellationToken) -> Result<String> {
        let outcome = self.run_detailed(query, &cancel).await?;
        Ok(outcome.selection.report)
    }

    /// Run to completion, returning the final state and the execution trace.
    pub async fn run_detailed(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<ResearchOutcome> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research", %run_id);
        self.drive(run_id, query, cancel).instrument(span).await
    }

    async fn drive(
        &self,
        run_id: Uuid,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<ResearchOutcome> {
        let mut state = WorkflowState::new(query)?;
        let mut steps: Vec<WorkflowStep> = Vec::new();
        let mut feedback: Option<String> = None;
        let mut stage = Stage::Plan;

        tracing::info!(query, "Research run started");

        loop {
            let started = Instant::now();
            let timestamp = Utc::now().timestamp();

            let (next, detail) = match stage {
                Stage::Plan => {
                    self.progress.emit(ProgressEvent::Planning {
                        iteration: state.search_iteration() + 1,
                    });
                    let plan = cancellable(
                        cancel,
                        self.planner.plan_with_feedback(
                            state.user_query(),
                            state.search_iteration(),
                            feedback.as_deref(),
                        ),
                    )
                    .await?;
                    let detail = format!(
                        "iteration {}: {} queries",
                        plan.iteration,
                        plan.queries.len()
                    );
                    state.apply_plan(plan)?;
                    (Stage::Search, detail)
                }

                Stage::Search => {
                    self.progress.emit(ProgressEvent::Searching {
                        queries: state.search_queries().to_vec(),
                    });
                    let before = (state.search_results().len(), state.summaries().len());

                    let set = DispatchSet::new(
                        state.search_queries().iter().map(|q| q.query.clone()),
                    );
                    let branches = set.len();
                    let retriever = self.retriever.clone();
                    let user_query: Arc<str> = Arc::from(state.user_query());
                    let seen = Arc::new(state.seen_urls());

                    let deltas = fan_out(set, cancel, move |search_query| {
                        let retriever = retriever.clone();
                        let user_query = user_query.clone();
                        let seen = seen.clone();
                        async move { retriever.retrieve(&user_query, &search_query, &seen).await }
                    })
                    .await?;
                    check_fan_in(branches, deltas.len())?;
                    state.merge_retrievals(deltas);

                    let detail = format!(
                        "{} branches: +{} pages, +{} summaries",
                        branches,
                        state.search_results().len() - before.0,
                        state.summaries().len() - before.1
                    );
                    (Stage::Review, detail)
                }

                Stage::Review => {
                    self.progress.emit(ProgressEvent::Reviewing {
                        iteration: state.search_iteration(),
                        summaries: state.summaries().len(),
                    });
                    let verdict = cancellable(
                        cancel,
                        self.reviewer.review(
                            state.user_query(),
                            state.summaries(),
                            state.search_iteration(),
                        ),
                    )
                    .await?;

                    let proceed = verdict.is_complete
                        || state.search_iteration() >= self.reviewer.max_iterations();
                    feedback = (!proceed).then(|| verdict.justification.clone());
                    let detail = format!("complete={}: {}", verdict.is_complete, verdict.justification);
                    state.apply_review(verdict);

                    let next = if proceed { Stage::Draft } else { Stage::Plan };
                    (next, detail)
                }

                Stage::Draft => {
                    self.progress.emit(ProgressEvent::Writing {
                        drafts: self.draft_count,
                    });
                    let drafter = self.drafter.clone();
                    let user_query: Arc<str> = Arc::from(state.user_query());
                    let summaries: Arc<Vec<Summary>> = Arc::new(state.summaries().to_vec());

                    let drafts = fan_out(
                        DispatchSet::replicate((), self.draft_count),
                        cancel,
                        move |_| {
                            let drafter = drafter.clone();
                            let user_query = user_query.clone();
                            let summaries = summaries.clone();
                            async move { drafter.draft(&user_query, &summaries).await }
                        },
                    )
                    .await?;
                    check_fan_in(self.draft_count, drafts.len())?;
                    state.merge_drafts(drafts);

                    let detail = format!("{} candidate reports", state.reports().len());
                    (Stage::Evaluate, detail)
                }

                Stage::Evaluate => {
                    self.progress.emit(ProgressEvent::Evaluating {
                        candidates: state.reports().len(),
                    });
                    let selection = cancellable(
                        cancel,
                        self.selector
                            .select(state.user_query(), state.summaries(), state.reports()),
                    )
                    .await??;
                    state.set_final_report(selection.report.clone())?;

                    steps.push(WorkflowStep {
                        stage,
                        detail: format!(
                            "selected report {}{}",
                            selection.index,
                            if selection.fell_back { " (fallback)" } else { "" }
                        ),
                        timestamp,
                        duration_ms: started.elapsed().as_millis() as u64,
                    });
                    self.progress.emit(ProgressEvent::Done {
                        report: selection.report.clone(),
                    });
                    tracing::info!(
                        iterations = state.search_iteration(),
                        pages = state.search_results().len(),
                        "Research run finished"
                    );

                    return Ok(ResearchOutcome {
                        run_id,
                        state,
                        selection,
                        steps,
                    });
                }
            };

            tracing::debug!(%stage, %detail, next = %next, "Stage finished");
            steps.push(WorkflowStep {
                stage,
                detail,
                timestamp,
                duration_ms: started.elapsed().as_millis() as u64,
            });
            stage = next;
        }
    }
}

/// Await `fut` unless `cancel` fires first.
async fn cancellable<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        value = fut => Ok(value),
    }
}

fn check_fan_in(dispatched: usize, merged: usize) -> Result<()> {
    if dispatched != merged {
        return Err(AppError::Internal(format!(
            "Fan-in mismatch: dispatched {} branches, got {} results",
            dispatched, merged
        )));
    }
    Ok(())
}

/// Assembles a [`ResearchWorkflow`] from its capabilities.
///
/// Only the generation clients are mandatory. Search and scraping default to
/// [`DaedraWeb`], ranking to [`Bm25Ranker`].
#[derive(Default)]
pub struct ResearchWorkflowBuilder {
    research_llm: Option<Arc<dyn LLMClient>>,
    writing_llm: Option<Arc<dyn LLMClient>>,
    search: Option<Arc<dyn WebSearch>>,
    scraper: Option<Arc<dyn PageScraper>>,
    ranker: Option<Arc<dyn RelevanceRanker>>,
    config: ResearchConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl ResearchWorkflowBuilder {
    pub async fn from_config(config: &DeepResearchConfig) -> Result<Self> {
        config.validate()?;

        let research = config.research_provider()?;
        let writing = config.writing_provider()?;
        tracing::info!(
            provider = research.name(),
            research_model = research.model(),
            writing_model = writing.model(),
            "Creating LLM clients"
        );

        let research_llm: Arc<dyn LLMClient> = Arc::from(research.create_client().await?);
        let writing_llm: Arc<dyn LLMClient> = Arc::from(writing.create_client().await?);
        let web = Arc::new(DaedraWeb::new(config.research.search_results));

        Ok(Self::default()
            .research_llm(research_llm)
            .writing_llm(writing_llm)
            .web(web)
            .config(config.research.clone()))
    }

    /// Model for planning, summarizing and reviewing
    pub fn research_llm(mut self, llm: Arc<dyn LLMClient>) -> Self {
        self.research_llm = Some(llm);
        self
    }

    /// Model for drafting and evaluation
    pub fn writing_llm(mut self, llm: Arc<dyn LLMClient>) -> Self {
        self.writing_llm = Some(llm);
        self
    }

    /// Use one backend for both search and scraping
    pub fn web<W>(self, web: Arc<W>) -> Self
    where
        W: WebSearch + PageScraper + 'static,
    {
        self.search(web.clone()).scraper(web)
    }

    pub fn search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn scraper(mut self, scraper: Arc<dyn PageScraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    pub fn ranker(mut self, ranker: Arc<dyn RelevanceRanker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    pub fn config(mut self, config: ResearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn build(self) -> Result<ResearchWorkflow> {
        let research_llm = self
            .research_llm
            .ok_or_else(|| AppError::Configuration("research model not set".to_string()))?;
        let writing_llm = self
            .writing_llm
            .ok_or_else(|| AppError::Configuration("writing model not set".to_string()))?;

        let config = self.config;
        if config.max_iterations == 0 {
            return Err(AppError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if config.draft_count == 0 {
            return Err(AppError::Configuration(
                "draft_count must be at least 1".to_string(),
            ));
        }
        if config.snippet_overlap >= config.snippet_size {
            return Err(AppError::Configuration(
                "snippet_overlap must be smaller than snippet_size".to_string(),
            ));
        }

        let research = StructuredCaller::new(research_llm, config.max_attempts)?;
        let writing = StructuredCaller::new(writing_llm, config.max_attempts)?;

        let search: Arc<dyn WebSearch> = match self.search {
            Some(search) => search,
            None => Arc::new(DaedraWeb::new(config.search_results)),
        };
        let scraper: Arc<dyn PageScraper> = match self.scraper {
            Some(scraper) => scraper,
            None => Arc::new(DaedraWeb::new(config.search_results)),
        };
        let ranker: Arc<dyn RelevanceRanker> = match self.ranker {
            Some(ranker) => ranker,
            None => Arc::new(Bm25Ranker),
        };

        let retriever = Retriever::new(
            research.clone(),
            search,
            scraper,
            ranker,
            TextChunker::new(config.snippet_size, config.snippet_overlap),
            config.top_k,
        );

        Ok(ResearchWorkflow {
            planner: QueryPlanner::new(research.clone()),
            retriever: Arc::new(retriever),
            reviewer: ReviewGate::new(research, config.max_iterations),
            drafter: Arc::new(Drafter::new(writing.clone())),
            selector: Selector::new(writing),
            draft_count: config.draft_count,
            progress: ProgressSink::new(self.progress),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct SilentClient;

    #[async_trait]
    impl LLMClient for SilentClient {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AppError::LLM("offline".to_string()))
        }

        async fn generate_with_system(&self, _system: &str, _prompt: &str) -> Result<String> {
            Err(AppError::LLM("offline".to_string()))
        }

        async fn generate_with_history(&self, _messages: &[(String, String)]) -> Result<String> {
            Err(AppError::LLM("offline".to_string()))
        }

        fn model_name(&self) -> &str {
            "silent"
        }
    }

    #[test]
    fn test_build_requires_models() {
        assert!(matches!(
            ResearchWorkflow::builder().build(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_build_rejects_zero_drafts() {
        let llm: Arc<dyn LLMClient> = Arc::new(SilentClient);
        let result = ResearchWorkflow::builder()
            .research_llm(llm.clone())
            .writing_llm(llm)
            .config(ResearchConfig {
                draft_count: 0,
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_with_defaults() {
        let llm: Arc<dyn LLMClient> = Arc::new(SilentClient);
        let workflow = ResearchWorkflow::builder()
            .research_llm(llm.clone())
            .writing_llm(llm)
            .build()
            .unwrap();
        assert_eq!(workflow.draft_count(), 5);
        assert_eq!(workflow.max_iterations(), 3);
    }

    #[test]
    fn test_fan_in_mismatch_is_internal() {
        assert!(check_fan_in(5, 5).is_ok());
        assert!(matches!(check_fan_in(5, 4), Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = cancellable(&cancel, async { 1 }).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
