use thiserror::Error;

use crate::llm_client::GenerationError;
use crate::workflow::prompts::MissingFieldError;

/// Problems with what the host wrote to stdin.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read stdin: {0}")]
    Io(#[from] std::io::Error),
}

/// Agent-level error type.
/// The boundary is the only place these are turned into exit codes and stderr text.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    MissingField(#[from] MissingFieldError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{0:#}")]
    Config(anyhow::Error),

    #[error("failed to write output: {0}")]
    Output(std::io::Error),
}

impl AgentError {
    /// One-line diagnostic written to stderr before a non-zero exit.
    pub fn diagnostic(&self) -> String {
        let prefix = match self {
            AgentError::Input(_) => "Error parsing input",
            _ => "Agent Error",
        };
        let cause = self.to_string();
        let cause = cause.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("{prefix}: {cause}")
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::Input(InputError::Json(e))
    }
}
