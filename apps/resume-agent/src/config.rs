use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_OPENAI_MODEL};

/// Which hosted model API the agent talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    fn api_key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => DEFAULT_OPENAI_MODEL,
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(anyhow!(
                "LLM_PROVIDER must be 'openai' or 'anthropic', got '{other}'"
            )),
        }
    }
}

/// Process configuration loaded from environment variables (and `.env` if present).
///
/// Loaded only after stdin has been validated, so the empty-input and bad-input
/// paths never need credentials.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
    /// Cap on Rewrite executions. `None` keeps the loop unbounded.
    pub max_rewrite_passes: Option<u32>,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match non_empty(&lookup, "LLM_PROVIDER") {
            Some(raw) => raw.parse::<Provider>()?,
            None => Provider::OpenAi,
        };

        let api_key = non_empty(&lookup, provider.api_key_var()).with_context(|| {
            format!(
                "Required environment variable '{}' is not set",
                provider.api_key_var()
            )
        })?;

        let model = non_empty(&lookup, "LLM_MODEL")
            .unwrap_or_else(|| provider.default_model().to_string());

        let timeout_secs = match non_empty(&lookup, "LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => 120,
        };

        let max_rewrite_passes = match non_empty(&lookup, "MAX_REWRITE_PASSES") {
            Some(raw) => {
                let cap = raw
                    .parse::<u32>()
                    .context("MAX_REWRITE_PASSES must be a positive integer")?;
                if cap == 0 {
                    return Err(anyhow!("MAX_REWRITE_PASSES must be at least 1"));
                }
                Some(cap)
            }
            None => None,
        };

        Ok(Config {
            provider,
            api_key,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            max_rewrite_passes,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}
