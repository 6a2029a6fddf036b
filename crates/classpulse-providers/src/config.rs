//! Configuration loading and orchestrator factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use classpulse_core::orchestrator::QuizOrchestrator;

use crate::anthropic::DEFAULT_BASE_URL;
use crate::generation::{GenerationClient, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Environment variable that overrides the configured credential.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// File name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "classpulse.toml";

/// Settings for live quiz generation.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Additional attempts after the first.
    pub max_retries: u32,
    pub initial_retry_delay_secs: f64,
    /// Per-call timeout.
    pub request_timeout_secs: u64,
    /// Max concurrent generations for batch commands.
    pub parallelism: usize,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "***" };
        f.debug_struct("GenerationConfig")
            .field("api_key", &key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("initial_retry_delay_secs", &self.initial_retry_delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("parallelism", &self.parallelism)
            .finish()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_retries: 3,
            initial_retry_delay_secs: 1.0,
            request_timeout_secs: 30,
            parallelism: 4,
        }
    }
}

/// Top-level classpulse configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClasspulseConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `classpulse.toml` in the current directory
/// 2. `~/.config/classpulse/config.toml`
///
/// `ANTHROPIC_API_KEY` overrides the configured key when set.
pub fn load_config_from(path: Option<&Path>) -> Result<ClasspulseConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClasspulseConfig::default(),
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.generation.api_key = key;
        }
    }

    tracing::debug!(
        path = ?config_path,
        config = ?config.generation,
        "configuration loaded"
    );
    Ok(config)
}

/// Parse a TOML document and resolve `${VAR}` references.
pub fn parse_config(content: &str) -> Result<ClasspulseConfig> {
    let mut config: ClasspulseConfig = toml::from_str(content)?;
    let generation = &mut config.generation;
    generation.api_key = resolve_env_vars(&generation.api_key);
    generation.base_url = generation.base_url.as_deref().map(resolve_env_vars);
    generation.model = resolve_env_vars(&generation.model);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("classpulse"))
}

/// Build the orchestrator for a loaded configuration.
///
/// A missing credential is not an error: the orchestrator then serves
/// fallback quizzes only.
pub fn build_orchestrator(config: &ClasspulseConfig) -> Result<QuizOrchestrator> {
    match GenerationClient::new(&config.generation) {
        Ok(client) => Ok(QuizOrchestrator::new(Some(Arc::new(client)))),
        Err(failure) if config.generation.api_key.trim().is_empty() => {
            tracing::warn!("{failure} Serving fallback quizzes only.");
            Ok(QuizOrchestrator::fallback_only())
        }
        Err(failure) => Err(anyhow::Error::new(failure)),
    }
}

/// Starter configuration written by `classpulse init`.
pub fn starter_config() -> String {
    format!(
        r#"# classpulse configuration

[generation]
# Resolved from the environment; ANTHROPIC_API_KEY also overrides this value.
api_key = "${{{API_KEY_ENV}}}"
base_url = "{DEFAULT_BASE_URL}"
model = "{DEFAULT_MODEL}"
max_tokens = {DEFAULT_MAX_TOKENS}
max_retries = 3
initial_retry_delay_secs = 1.0
request_timeout_secs = 30
parallelism = 4
"#
    )
}
