//! The three workflow steps. Each renders its prompt from the current state,
//! makes exactly one generation call, and returns a partial update.
//! Steps never retry; any failure aborts the run.

use std::fmt;

use tracing::debug;

use crate::errors::AgentError;
use crate::llm_client::{GenerationError, TextGenerator};
use crate::workflow::prompts::{render, TemplateId};
use crate::workflow::state::{StateUpdate, WorkflowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Analyze,
    Rewrite,
    FactCheck,
}

impl Step {
    pub fn template(self) -> TemplateId {
        match self {
            Step::Analyze => TemplateId::GapAnalysis,
            Step::Rewrite => TemplateId::Rewrite,
            Step::FactCheck => TemplateId::FactCheck,
        }
    }

    /// Runs the step against `state` and returns the update to merge.
    pub async fn run(
        self,
        state: &WorkflowState,
        generator: &dyn TextGenerator,
    ) -> Result<StateUpdate, AgentError> {
        match self {
            Step::Analyze => analyze(state, generator).await,
            Step::Rewrite => rewrite(state, generator).await,
            Step::FactCheck => fact_check(state, generator).await,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Analyze => "analyze",
            Step::Rewrite => "rewrite",
            Step::FactCheck => "fact_check",
        };
        f.write_str(name)
    }
}

/// Gap analysis: sets `critique` and bumps `iterations`.
pub async fn analyze(
    state: &WorkflowState,
    generator: &dyn TextGenerator,
) -> Result<StateUpdate, AgentError> {
    let gap_analysis = invoke(Step::Analyze, state, generator).await?;
    Ok(StateUpdate {
        critique: Some(gap_analysis),
        iterations: Some(state.iterations + 1),
        ..Default::default()
    })
}

/// Fact-constrained rewrite: sets `tailored_resume`. Needs `critique`.
pub async fn rewrite(
    state: &WorkflowState,
    generator: &dyn TextGenerator,
) -> Result<StateUpdate, AgentError> {
    let tailored = invoke(Step::Rewrite, state, generator).await?;
    Ok(StateUpdate {
        tailored_resume: Some(tailored),
        ..Default::default()
    })
}

/// Fact check of the draft against the original: overwrites `critique` with the verdict.
pub async fn fact_check(
    state: &WorkflowState,
    generator: &dyn TextGenerator,
) -> Result<StateUpdate, AgentError> {
    let verdict = invoke(Step::FactCheck, state, generator).await?;
    Ok(StateUpdate {
        critique: Some(verdict),
        ..Default::default()
    })
}

async fn invoke(
    step: Step,
    state: &WorkflowState,
    generator: &dyn TextGenerator,
) -> Result<String, AgentError> {
    let prompt = render(step.template(), state)?;
    debug!(step = %step, prompt_chars = prompt.len(), "Calling generator");

    let text = generator.generate(&prompt).await?;
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyContent.into());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::testing::ScriptedGenerator;

    fn analyzed_state() -> WorkflowState {
        let mut state = WorkflowState::new("Engineer at X, 2019-2022", "Python backend");
        state.apply(StateUpdate {
            critique: Some("Missing Python".to_string()),
            iterations: Some(1),
            ..Default::default()
        });
        state
    }

    #[tokio::test]
    async fn test_analyze_sets_critique_and_increments_iterations() {
        let generator = ScriptedGenerator::new().analysis(["Gap: Python"]);
        let state = WorkflowState::new("Engineer at X", "Python backend");

        let update = analyze(&state, &generator).await.unwrap();
        assert_eq!(update.critique.as_deref(), Some("Gap: Python"));
        assert_eq!(update.iterations, Some(1));
        assert!(update.tailored_resume.is_none());
        assert_eq!(generator.calls(), vec![Step::Analyze]);
    }

    #[tokio::test]
    async fn test_rewrite_sets_tailored_resume_only() {
        let generator = ScriptedGenerator::new().rewrites(["# Backend Engineer at X"]);
        let update = rewrite(&analyzed_state(), &generator).await.unwrap();
        assert_eq!(
            update.tailored_resume.as_deref(),
            Some("# Backend Engineer at X")
        );
        assert!(update.critique.is_none());
        assert!(update.iterations.is_none());
    }

    #[tokio::test]
    async fn test_rewrite_before_analyze_is_missing_field() {
        let generator = ScriptedGenerator::new().rewrites(["draft"]);
        let state = WorkflowState::new("r", "jd");
        let err = rewrite(&state, &generator).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingField(_)));
        assert!(generator.calls().is_empty(), "no call before render succeeds");
    }

    #[tokio::test]
    async fn test_fact_check_before_rewrite_is_missing_field() {
        let generator = ScriptedGenerator::new().verdicts(["FACTUAL"]);
        let err = fact_check(&analyzed_state(), &generator).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingField(_)));
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fact_check_overwrites_critique() {
        let generator = ScriptedGenerator::new().verdicts(["NEEDS REVISION"]);
        let mut state = analyzed_state();
        state.apply(StateUpdate {
            tailored_resume: Some("draft".to_string()),
            ..Default::default()
        });
        let update = fact_check(&state, &generator).await.unwrap();
        assert_eq!(update.critique.as_deref(), Some("NEEDS REVISION"));
    }

    #[tokio::test]
    async fn test_blank_generation_is_error() {
        let generator = ScriptedGenerator::new().rewrites(["  \n"]);
        let err = rewrite(&analyzed_state(), &generator).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::Generation(GenerationError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let generator = ScriptedGenerator::new();
        let err = analyze(&WorkflowState::new("r", "jd"), &generator)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Generation(_)));
    }

    #[tokio::test]
    async fn test_step_run_dispatches() {
        let generator = ScriptedGenerator::new().analysis(["gaps"]);
        let update = Step::Analyze
            .run(&WorkflowState::new("r", "jd"), &generator)
            .await
            .unwrap();
        assert_eq!(update.critique.as_deref(), Some("gaps"));
    }
}
