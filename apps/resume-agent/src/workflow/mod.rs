// Resume tailoring workflow: gap analysis, fact-constrained rewrite, fact check.
// All generation goes through the injected `TextGenerator`; nothing here talks HTTP.

pub mod engine;
pub mod prompts;
pub mod state;
pub mod steps;
pub mod verdict;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineOptions, WorkflowEngine};
pub use state::WorkflowState;
