//! Process boundary: one JSON request on stdin, the tailored resume on stdout,
//! a one-line diagnostic on stderr and a non-zero exit on failure.
//!
//! This is the only place errors become exit codes. Nothing is written to stdout
//! unless the whole workflow succeeded.

use std::io::{Read, Write};

use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{AgentError, InputError};
use crate::workflow::{WorkflowEngine, WorkflowState};

/// Request payload written by the host process.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentInput {
    pub resume: String,
    pub jd: String,
}

impl AgentInput {
    pub fn into_state(self) -> WorkflowState {
        WorkflowState::new(self.resume, self.jd)
    }
}

/// Parses the raw stdin payload. `Ok(None)` means the host sent nothing at all;
/// whitespace-only input is malformed JSON like anything else.
pub fn parse_input(raw: &str) -> Result<Option<AgentInput>, AgentError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let input: AgentInput = serde_json::from_str(raw)?;
    Ok(Some(input))
}

pub fn read_input<R: Read>(mut reader: R) -> Result<Option<AgentInput>, AgentError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(InputError::from)?;
    parse_input(&raw)
}

/// Runs the workflow and returns the artifact to emit.
pub async fn execute(input: AgentInput, engine: &WorkflowEngine) -> Result<String, AgentError> {
    let outcome = engine.run(input.into_state()).await?;
    info!(
        iterations = outcome.state.iterations,
        passes = outcome.rewrite_passes,
        fact_checks = outcome.fact_checks,
        ambiguous = outcome.ambiguous_verdicts,
        termination = ?outcome.termination,
        "Workflow finished"
    );
    debug!(trace = ?outcome.trace, "Phase trace");
    Ok(outcome.tailored_resume)
}

/// Writes the artifact verbatim, with no framing or trailing newline.
pub fn write_output<W: Write>(mut writer: W, tailored_resume: &str) -> Result<(), AgentError> {
    writer
        .write_all(tailored_resume.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(AgentError::Output)
}

pub fn report_failure<W: Write>(mut writer: W, err: &AgentError) {
    debug!(error = ?err, "Invocation failed");
    // Nothing left to report to if stderr itself is gone.
    let _ = writeln!(writer, "{}", err.diagnostic());
    let _ = writer.flush();
}

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Full request lifecycle; returns the process exit status.
///
/// `build_engine` runs only once a valid request is in hand, so empty and
/// malformed input never touch configuration or credentials.
pub async fn run<R, W, E, F>(stdin: R, stdout: W, stderr: E, build_engine: F) -> u8
where
    R: Read,
    W: Write,
    E: Write,
    F: FnOnce() -> Result<WorkflowEngine, AgentError>,
{
    match serve(stdin, stdout, build_engine).await {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            report_failure(stderr, &err);
            EXIT_FAILURE
        }
    }
}

async fn serve<R, W, F>(stdin: R, stdout: W, build_engine: F) -> Result<(), AgentError>
where
    R: Read,
    W: Write,
    F: FnOnce() -> Result<WorkflowEngine, AgentError>,
{
    let Some(input) = read_input(stdin)? else {
        info!("Empty input; nothing to do");
        return Ok(());
    };

    let engine = build_engine()?;
    let tailored_resume = execute(input, &engine).await?;
    write_output(stdout, &tailored_resume)
}
