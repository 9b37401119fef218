//! Research nodes
//!
//! Each node wraps one kind of model call and never fails: on exhausted
//! retries it returns a documented fallback so the run always advances.
//!
//! - [`planner::QueryPlanner`] - writes 3-5 search queries per pass
//! - [`retriever::Retriever`] - search, scrape, rank and summarize one query
//! - [`reviewer::ReviewGate`] - judges sufficiency, forced complete at the cap
//! - [`drafter::Drafter`] - writes one candidate report
//! - [`selector::Selector`] - scores candidates and picks the final report

pub mod drafter;
pub mod planner;
pub mod prompts;
pub mod retriever;
pub mod reviewer;
pub mod selector;

pub use drafter::Drafter;
pub use planner::{PlanOutput, QueryPlanner};
pub use retriever::{RetrievalDelta, Retriever};
pub use reviewer::ReviewGate;
pub use selector::{Selection, Selector};
