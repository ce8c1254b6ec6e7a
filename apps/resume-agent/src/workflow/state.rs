//! The record threaded through the engine for one invocation.

/// Workflow state for a single tailoring run.
///
/// `resume` and `job_description` are set once in `new` and exposed read-only.
/// Steps never mutate the state directly: they return a `StateUpdate` which the
/// engine merges with `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    resume: String,
    job_description: String,
    /// Latest Rewrite output. `None` until Rewrite has run once.
    pub tailored_resume: Option<String>,
    /// Latest critique: the gap analysis after Analyze, the verdict after FactCheck.
    pub critique: Option<String>,
    /// Number of Analyze executions.
    pub iterations: u32,
}

/// Partial update produced by a workflow step. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub tailored_resume: Option<String>,
    pub critique: Option<String>,
    pub iterations: Option<u32>,
}

impl WorkflowState {
    pub fn new(resume: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume: resume.into(),
            job_description: job_description.into(),
            tailored_resume: None,
            critique: None,
            iterations: 0,
        }
    }

    pub fn resume(&self) -> &str {
        &self.resume
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// Merges a step's output into the state.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(tailored) = update.tailored_resume {
            self.tailored_resume = Some(tailored);
        }
        if let Some(critique) = update.critique {
            self.critique = Some(critique);
        }
        if let Some(iterations) = update.iterations {
            self.iterations = iterations;
        }
    }
}
