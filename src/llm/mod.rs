//! LLM Provider Clients and Structured Generation
//!
//! This module provides a unified interface for the generation capability used
//! by the research workflow. Provider-specific code stays behind the
//! [`LLMClient`] trait; the [`StructuredCaller`] turns that free-text
//! capability into "ask for a typed result, retry on failure, fall back".
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use deep_research::llm::{Provider, StructuredCaller};
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "qwen3:8b".to_string(),
//! }
//! .create_client()
//! .await?;
//!
//! let caller = StructuredCaller::new(client.into(), 5)?;
//! let verdict: ReviewVerdict = caller.call(&prompt, fallback).await;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Retry combinator for schema-validated generation.
pub mod structured;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
pub use structured::{CallOutcome, StructuredCaller, StructuredOutput};
