//! Loop predicate: decides whether the fact-check verdict ends the rewrite loop.
//!
//! The verdict is free-form model output. The only contract is the literal marker
//! `FACTUAL` (case-sensitive, anywhere in the text), which the fact-check prompt
//! asks the model to emit. Note that `NOT FACTUAL` also contains the marker.

use crate::workflow::state::WorkflowState;

pub const FACTUAL_MARKER: &str = "FACTUAL";
pub const REVISION_MARKER: &str = "NEEDS REVISION";

/// Coarse reading of a fact-check verdict, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Factual,
    NeedsRevision,
    /// Neither marker present. The loop continues, but the engine flags it.
    Ambiguous,
}

impl Verdict {
    pub fn classify(critique: &str) -> Self {
        if critique.contains(FACTUAL_MARKER) {
            Verdict::Factual
        } else if critique.contains(REVISION_MARKER) {
            Verdict::NeedsRevision
        } else {
            Verdict::Ambiguous
        }
    }
}

/// True when the latest critique carries the `FACTUAL` marker.
/// An unset or empty critique never stops the loop.
pub fn should_stop(state: &WorkflowState) -> bool {
    state
        .critique
        .as_deref()
        .is_some_and(|c| c.contains(FACTUAL_MARKER))
}

/// Pluggable stop condition evaluated after every FactCheck.
pub trait StopCondition: Send + Sync {
    fn should_stop(&self, state: &WorkflowState) -> bool;
}

/// Default condition: the `FACTUAL` marker convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactualMarker;

impl StopCondition for FactualMarker {
    fn should_stop(&self, state: &WorkflowState) -> bool {
        should_stop(state)
    }
}
