mod boundary;
mod config;
mod errors;
mod llm_client;
mod workflow;

use std::io::{stderr, stdin, stdout};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::AgentError;
use crate::llm_client::LlmClient;
use crate::workflow::verdict::FactualMarker;
use crate::workflow::{EngineOptions, WorkflowEngine};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok(); // load .env if present; ignore if missing

    // Structured logging on stderr; stdout carries only the tailored resume.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=warn", env!("CARGO_CRATE_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(stderr))
        .init();

    info!("Starting resume-agent v{}", env!("CARGO_PKG_VERSION"));

    let status = boundary::run(stdin().lock(), stdout().lock(), stderr(), build_engine).await;
    ExitCode::from(status)
}

/// Loads configuration and wires the LLM client into the engine.
/// Called only after a valid request has been read.
fn build_engine() -> Result<WorkflowEngine, AgentError> {
    let config = Config::from_env().map_err(AgentError::Config)?;

    let llm = LlmClient::from_config(&config)?;
    info!(
        provider = ?llm.provider(),
        model = llm.model(),
        "LLM client initialized"
    );

    // Loop ends on the FACTUAL marker; swap the condition here to change that contract.
    let stop_condition = Arc::new(FactualMarker);

    Ok(WorkflowEngine::new(Arc::new(llm))
        .with_stop_condition(stop_condition)
        .with_options(EngineOptions {
            max_rewrite_passes: config.max_rewrite_passes,
        }))
}
