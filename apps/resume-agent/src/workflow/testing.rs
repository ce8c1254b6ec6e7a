//! Scripted `TextGenerator` for workflow tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{GenerationError, TextGenerator};
use crate::workflow::steps::Step;

/// Replays queued responses per step. The step is recognised from the template
/// the prompt was rendered from. `None` in a queue means "fail this call".
#[derive(Default)]
pub struct ScriptedGenerator {
    inner: Mutex<Script>,
}

#[derive(Default)]
struct Script {
    analysis: VecDeque<Option<String>>,
    rewrites: VecDeque<Option<String>>,
    verdicts: VecDeque<Option<String>>,
    calls: Vec<Step>,
    prompts: Vec<String>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Step::Analyze, responses)
    }

    pub fn rewrites<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Step::Rewrite, responses)
    }

    pub fn verdicts<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Step::FactCheck, responses)
    }

    /// Queues a failing call for `step`.
    pub fn failure(self, step: Step) -> Self {
        self.lock().queue(step).push_back(None);
        self
    }

    pub fn calls(&self) -> Vec<Step> {
        self.lock().calls.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    pub fn count(&self, step: Step) -> usize {
        self.lock().calls.iter().filter(|s| **s == step).count()
    }

    fn push<I, S>(self, step: Step, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut script = self.lock();
            let queue = script.queue(step);
            queue.extend(responses.into_iter().map(|r| Some(r.into())));
        }
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.inner.lock().unwrap()
    }
}

impl Script {
    fn queue(&mut self, step: Step) -> &mut VecDeque<Option<String>> {
        match step {
            Step::Analyze => &mut self.analysis,
            Step::Rewrite => &mut self.rewrites,
            Step::FactCheck => &mut self.verdicts,
        }
    }
}

fn step_for_prompt(prompt: &str) -> Option<Step> {
    [Step::Analyze, Step::Rewrite, Step::FactCheck]
        .into_iter()
        .find(|step| {
            let first_line = step.template().text().lines().next().unwrap_or_default();
            prompt.starts_with(first_line)
        })
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let step = step_for_prompt(prompt).ok_or_else(|| {
            GenerationError::Misconfigured("prompt does not match any template".to_string())
        })?;

        let mut script = self.lock();
        script.calls.push(step);
        script.prompts.push(prompt.to_string());

        match script.queue(step).pop_front() {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(GenerationError::Api {
                status: 503,
                message: format!("scripted {step} failure"),
            }),
            None => Err(GenerationError::Misconfigured(format!(
                "no scripted response left for {step}"
            ))),
        }
    }
}
