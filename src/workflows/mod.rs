//! Workflow Orchestration
//!
//! The research run as an explicit state machine:
//!
//! ```text
//! PLAN -> SEARCH (fan-out) -> REVIEW -> PLAN          (incomplete, below cap)
//!                                    -> DRAFT (fan-out) -> EVALUATE -> DONE
//! ```
//!
//! - [`state`] - the shared [`WorkflowState`] and its merge rules
//! - [`fanout`] - dispatch sets and the generic fan-out/fan-in primitive
//! - [`events`] - progress notifications
//! - [`engine`] - the orchestrator itself
//!
//! # Usage
//!
//! ```ignore
//! let config = DeepResearchConfig::load("deep-research.toml")?;
//! let workflow = ResearchWorkflow::from_config(&config).await?;
//! let report = workflow.run("How do heat pumps perform below -20C?").await?;
//! println!("{}", report);
//! ```

pub mod engine;
pub mod events;
pub mod fanout;
pub mod state;

pub use engine::{
    ResearchOutcome, ResearchWorkflow, ResearchWorkflowBuilder, Stage, WorkflowStep,
};
pub use events::{ProgressEvent, ProgressSink};
pub use fanout::{fan_out, Branch, DispatchSet};
pub use state::WorkflowState;
