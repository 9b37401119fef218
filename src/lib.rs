//! # deep-research
//!
//! Turns a free-form question into a cited research report through an
//! iterative, multi-stage LLM workflow: plan search queries, retrieve and
//! summarize evidence, judge whether the evidence is sufficient, draft several
//! candidate reports in parallel and keep the one that scores best.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use deep_research::{DeepResearchConfig, ResearchWorkflow};
//!
//! #[tokio::main]
//! async fn main() -> deep_research::Result<()> {
//!     let config = DeepResearchConfig::load_or_default("deep-research.toml")?;
//!     let workflow = ResearchWorkflow::from_config(&config).await?;
//!
//!     let report = workflow.run("How much does offshore wind cost per MWh?").await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ### Custom capabilities
//!
//! Every external capability sits behind a trait, so any of them can be
//! replaced (a different search engine, a hosted model, an embedding ranker):
//!
//! ```rust,ignore
//! use deep_research::ResearchWorkflow;
//! use std::sync::Arc;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let workflow = ResearchWorkflow::builder()
//!     .research_llm(Arc::new(my_small_model))
//!     .writing_llm(Arc::new(my_large_model))
//!     .web(Arc::new(MySearxng::new("http://localhost:8888")))
//!     .progress(tx)
//!     .build()?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints |
//!
//! ## Modules
//!
//! - [`llm`] - LLM clients and schema-validated generation with retries
//! - [`research`] - Planner, retriever, reviewer, drafter and selector nodes
//! - [`workflows`] - Shared state, fan-out/fan-in and the orchestrator
//! - [`rag`] - Chunking and BM25 relevance ranking of scraped pages
//! - [`tools`] - Web search and page scraping
//! - [`types`] - Research records and error handling
//! - [`utils`] - TOML configuration
//! - [`cli`] - Command-line parsing and colored output

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line interface for the deep-research binary.
pub mod cli;
/// LLM provider clients and structured generation.
pub mod llm;
/// Snippet chunking and relevance ranking.
pub mod rag;
/// The research workflow nodes.
pub mod research;
/// Web search and scraping capabilities.
pub mod tools;
/// Core records and errors.
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Workflow orchestration.
pub mod workflows;

// Re-export commonly used types
pub use llm::{LLMClient, Provider, StructuredCaller};
pub use types::{AppError, Result};
pub use utils::toml_config::DeepResearchConfig;
pub use workflows::{ProgressEvent, ResearchOutcome, ResearchWorkflow, WorkflowState};
