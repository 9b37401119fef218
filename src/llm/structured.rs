//! Schema-validated generation with bounded retries.
//!
//! The generation capability is unreliable: it may fail outright or return
//! something that is not the requested structure. [`StructuredCaller`] asks
//! for a typed result, treats transport errors, unparsable JSON and range
//! violations alike as a failed attempt, and gives up after `max_attempts`.
//! Callers that must never fail use [`StructuredCaller::call`] with a
//! fallback; callers that want to know what happened use
//! [`StructuredCaller::try_call`] and inspect the [`CallOutcome`].

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::llm::LLMClient;
use crate::types::{AppError, Result};

/// A result type the model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + JsonSchema + Send {
    /// Repairs applied to a parsed reply before it is validated.
    fn normalize(&mut self) {}

    /// Checks that serde cannot express (ranges, lengths, uniqueness).
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Result of a bounded sequence of generation attempts.
#[derive(Debug)]
pub enum CallOutcome<T> {
    /// A valid value was produced on attempt number `attempts`
    Success { value: T, attempts: u32 },
    /// Every attempt failed; `last_error` is the final failure
    Exhausted { last_error: AppError, attempts: u32 },
}

impl<T> CallOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            CallOutcome::Success { attempts, .. } | CallOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    pub fn ok(self) -> Option<T> {
        match self {
            CallOutcome::Success { value, .. } => Some(value),
            CallOutcome::Exhausted { .. } => None,
        }
    }

    pub fn unwrap_or(self, fallback: T) -> T {
        self.ok().unwrap_or(fallback)
    }
}

/// Retry combinator around [`LLMClient`] for typed results.
#[derive(Clone)]
pub struct StructuredCaller {
    llm: Arc<dyn LLMClient>,
    max_attempts: u32,
}

impl StructuredCaller {
    /// # Errors
    ///
    /// `max_attempts` must be at least 1.
    pub fn new(llm: Arc<dyn LLMClient>, max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(AppError::InvalidInput(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self { llm, max_attempts })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Ask for a `T`, returning `fallback` if every attempt fails.
    pub async fn call<T: StructuredOutput>(&self, prompt: &[String], fallback: T) -> T {
        self.try_call(prompt).await.unwrap_or(fallback)
    }

    /// Ask for a `T` up to `max_attempts` times.
    pub async fn try_call<T: StructuredOutput>(&self, prompt: &[String]) -> CallOutcome<T> {
        let messages = render_messages::<T>(prompt);
        let output_type = std::any::type_name::<T>();
        let mut last_error = AppError::LLM("no attempt made".to_string());

        for attempt in 1..=self.max_attempts {
            let result = match self.llm.generate_with_history(&messages).await {
                Ok(raw) => {
                    tracing::debug!(model = self.llm.model_name(), attempt, raw = %raw, "Raw generation");
                    parse_structured::<T>(&raw)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(value) => {
                    return CallOutcome::Success {
                        value,
                        attempts: attempt,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        model = self.llm.model_name(),
                        output_type,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Structured generation attempt failed"
                    );
                    last_error = e;
                }
            }
        }

        tracing::warn!(
            output_type,
            attempts = self.max_attempts,
            "Structured generation exhausted all attempts"
        );
        CallOutcome::Exhausted {
            last_error,
            attempts: self.max_attempts,
        }
    }
}

/// Every instruction goes out as a system message, followed by the output
/// contract for `T`.
fn render_messages<T: JsonSchema>(prompt: &[String]) -> Vec<(String, String)> {
    let schema = serde_json::to_string_pretty(&schemars::schema_for!(T))
        .unwrap_or_else(|_| "{}".to_string());

    prompt
        .iter()
        .map(|part| ("system".to_string(), part.clone()))
        .chain(std::iter::once((
            "system".to_string(),
            format!(
                "[OUTPUT FORMAT]: Respond with a single JSON object that validates against this JSON schema. Do not add any other text.\n{}",
                schema
            ),
        )))
        .collect()
}

/// Parse and validate a raw model reply.
pub fn parse_structured<T: StructuredOutput>(raw: &str) -> Result<T> {
    let json = extract_json_object(raw)
        .ok_or_else(|| AppError::InvalidInput("No JSON object in model output".to_string()))?;
    let mut value: T = serde_json::from_str(json)
        .map_err(|e| AppError::InvalidInput(format!("Output does not match schema: {}", e)))?;
    value.normalize();
    value.validate()?;
    Ok(value)
}

/// Locate the outermost JSON object, skipping reasoning blocks and code fences.
fn extract_json_object(raw: &str) -> Option<&str> {
    let body = match raw.rfind("</think>") {
        Some(end) => &raw[end + "</think>".len()..],
        None => raw,
    };
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}
