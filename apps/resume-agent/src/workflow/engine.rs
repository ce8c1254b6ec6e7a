//! Workflow Engine: drives Analyze → Rewrite → FactCheck with a self-correction loop.
//!
//! # State machine
//! ```text
//! Start ──► Analyzing ──► Writing ──► Reflecting ──► Done
//!                            ▲             │
//!                            └─────────────┘  stop condition false
//! ```
//! The phase names the step being executed. The stop condition is evaluated only
//! after FactCheck, never after Analyze, so a gap analysis is never read as a verdict.
//!
//! There is no iteration cap unless `EngineOptions::max_rewrite_passes` is set. When
//! the cap is hit the last draft is returned with a warning.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AgentError;
use crate::llm_client::TextGenerator;
use crate::workflow::prompts::{MissingFieldError, TemplateId};
use crate::workflow::state::WorkflowState;
use crate::workflow::steps::Step;
use crate::workflow::verdict::{FactualMarker, StopCondition, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Analyzing,
    Writing,
    Reflecting,
    Done,
}

/// Why the engine reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The stop condition accepted the latest fact-check verdict.
    Verified,
    /// `max_rewrite_passes` was reached without an accepted verdict.
    PassLimit,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Maximum number of Rewrite executions. `None` means unbounded.
    pub max_rewrite_passes: Option<u32>,
}

/// Terminal state plus bookkeeping about how the run went.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub state: WorkflowState,
    pub tailored_resume: String,
    pub rewrite_passes: u32,
    pub fact_checks: u32,
    /// Fact-check verdicts that carried neither marker.
    pub ambiguous_verdicts: u32,
    pub termination: Termination,
    /// Every phase entered, in order, starting with `Start` and ending with `Done`.
    pub trace: Vec<Phase>,
}

pub struct WorkflowEngine {
    generator: Arc<dyn TextGenerator>,
    stop_condition: Arc<dyn StopCondition>,
    options: EngineOptions,
}

impl WorkflowEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            stop_condition: Arc::new(FactualMarker),
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stop_condition(mut self, stop_condition: Arc<dyn StopCondition>) -> Self {
        self.stop_condition = stop_condition;
        self
    }

    /// Runs the state machine to `Done`. Any step failure aborts the run.
    pub async fn run(&self, state: WorkflowState) -> Result<WorkflowOutcome, AgentError> {
        let span = info_span!("workflow", run_id = %Uuid::new_v4());
        self.drive(state).instrument(span).await
    }

    async fn drive(&self, mut state: WorkflowState) -> Result<WorkflowOutcome, AgentError> {
        let mut phase = Phase::Start;
        let mut trace = vec![Phase::Start];
        let mut rewrite_passes = 0u32;
        let mut fact_checks = 0u32;
        let mut ambiguous_verdicts = 0u32;
        let mut termination = Termination::Verified;

        loop {
            let next = match phase {
                Phase::Start => Phase::Analyzing,

                Phase::Analyzing => {
                    self.execute(Step::Analyze, &mut state).await?;
                    info!(iteration = state.iterations, "Gap analysis complete");
                    Phase::Writing
                }

                Phase::Writing => {
                    self.execute(Step::Rewrite, &mut state).await?;
                    rewrite_passes += 1;
                    info!(pass = rewrite_passes, "Rewrite complete");
                    Phase::Reflecting
                }

                Phase::Reflecting => {
                    self.execute(Step::FactCheck, &mut state).await?;
                    fact_checks += 1;
                    if self.log_verdict(&state, fact_checks) == Verdict::Ambiguous {
                        ambiguous_verdicts += 1;
                    }

                    if self.stop_condition.should_stop(&state) {
                        Phase::Done
                    } else if self.pass_limit_reached(rewrite_passes) {
                        warn!(
                            passes = rewrite_passes,
                            "Rewrite pass limit reached without a FACTUAL verdict; \
                            returning the last draft"
                        );
                        termination = Termination::PassLimit;
                        Phase::Done
                    } else {
                        Phase::Writing
                    }
                }

                Phase::Done => break,
            };

            debug!(from = ?phase, to = ?next, "Phase transition");
            trace.push(next);
            phase = next;
        }

        // Reaching Done means FactCheck rendered, which needs a draft.
        let tailored_resume = state.tailored_resume.clone().ok_or(MissingFieldError {
            template: TemplateId::FactCheck,
            field: "tailored_resume",
        })?;

        Ok(WorkflowOutcome {
            state,
            tailored_resume,
            rewrite_passes,
            fact_checks,
            ambiguous_verdicts,
            termination,
            trace,
        })
    }

    async fn execute(&self, step: Step, state: &mut WorkflowState) -> Result<(), AgentError> {
        let update = step.run(state, self.generator.as_ref()).await?;
        state.apply(update);
        Ok(())
    }

    fn pass_limit_reached(&self, rewrite_passes: u32) -> bool {
        self.options
            .max_rewrite_passes
            .is_some_and(|cap| rewrite_passes >= cap)
    }

    fn log_verdict(&self, state: &WorkflowState, fact_check: u32) -> Verdict {
        let critique = state.critique.as_deref().unwrap_or_default();
        let verdict = Verdict::classify(critique);
        match verdict {
            Verdict::Factual => info!(fact_check, "Fact check passed"),
            Verdict::NeedsRevision => info!(fact_check, "Fact check requested revision"),
            Verdict::Ambiguous => warn!(
                fact_check,
                verdict = %critique.chars().take(120).collect::<String>(),
                "Ambiguous fact-check verdict (neither FACTUAL nor NEEDS REVISION); rewriting again"
            ),
        }
        verdict
    }
}
