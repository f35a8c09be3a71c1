//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Values are validated once after loading; an invalid value is a
//! [`DocError::Config`] and aborts startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{agent, gateway, generation};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Retry, cache and acceptance settings for the decision loop
    pub agent: AgentConfig,

    /// Generation service settings
    pub llm: LlmConfig,

    /// Discovery and output settings
    pub generation: GenerationConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;

        if self.generation.max_iterations == 0 {
            return Err(DocError::Config(
                "generation.max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.generation.read_concurrency == 0 {
            return Err(DocError::Config(
                "generation.read_concurrency must be greater than 0".to_string(),
            ));
        }

        if let Some(api_url) = &self.llm.api_url {
            url::Url::parse(api_url).map_err(|e| {
                DocError::Config(format!("llm.api_url '{}' is not a valid URL: {}", api_url, e))
            })?;
        }

        Ok(())
    }
}

// =============================================================================
// Agent Configuration
// =============================================================================

/// Options governing the critique/refine loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Attempts per generation call
    pub max_retries: u32,

    /// Backoff base in seconds (doubles after each failed attempt)
    pub retry_delay: u64,

    /// Minimum combined score for acceptance
    pub critique_threshold: f64,

    pub enable_caching: bool,

    pub cache_dir: PathBuf,

    pub cache_max_age_hours: u64,

    pub cache_max_entries: usize,

    /// Per-call timeout in seconds
    pub api_timeout: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_retries: agent::DEFAULT_MAX_RETRIES,
            retry_delay: agent::DEFAULT_RETRY_DELAY_SECS,
            critique_threshold: agent::DEFAULT_CRITIQUE_THRESHOLD,
            enable_caching: true,
            cache_dir: PathBuf::from(agent::DEFAULT_CACHE_DIR),
            cache_max_age_hours: agent::DEFAULT_CACHE_MAX_AGE_HOURS,
            cache_max_entries: agent::DEFAULT_CACHE_MAX_ENTRIES,
            api_timeout: agent::DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Non-negativity of retries, delay, age and entries is carried by the
    /// unsigned field types; only the remaining ranges are checked here.
    pub fn validate(&self) -> Result<()> {
        if !self.critique_threshold.is_finite() || !(0.0..=1.0).contains(&self.critique_threshold)
        {
            return Err(DocError::Config(format!(
                "critique_threshold must be between 0.0 and 1.0, got {}",
                self.critique_threshold
            )));
        }

        if self.api_timeout == 0 {
            return Err(DocError::Config(
                "api_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_hours.saturating_mul(3600))
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OllamaMode {
    Local,
    /// Matches the default `-cloud` model
    #[default]
    Cloud,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub mode: OllamaMode,

    /// Model identifier sent with every request (also part of the cache key)
    pub model: String,

    /// Explicit endpoint; overrides the mode default
    pub api_url: Option<String>,

    /// Bearer token, never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: OllamaMode::Cloud,
            model: gateway::DEFAULT_MODEL.to_string(),
            api_url: None,
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Endpoint to POST generation requests to
    pub fn endpoint(&self) -> &str {
        match (&self.api_url, self.mode) {
            (Some(url), _) => url,
            (None, OllamaMode::Local) => gateway::LOCAL_ENDPOINT,
            (None, OllamaMode::Cloud) => gateway::CLOUD_ENDPOINT,
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: markdown, html",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum files fed into prompts and the element index
    pub max_files: usize,

    /// Critique rounds before best-effort acceptance
    pub max_iterations: u32,

    /// Concurrent file reads during discovery
    pub read_concurrency: usize,

    pub format: OutputFormat,

    /// Output path; defaults to `documentation.<ext>` in the working directory
    pub output: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_files: generation::DEFAULT_MAX_FILES,
            max_iterations: generation::DEFAULT_MAX_ITERATIONS,
            read_concurrency: generation::DEFAULT_READ_CONCURRENCY,
            format: OutputFormat::Markdown,
            output: None,
        }
    }
}

impl GenerationConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}.{}",
                generation::DEFAULT_OUTPUT_STEM,
                self.format.extension()
            ))
        })
    }
}
