//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docloop/config.toml)
//! 3. Project config (.docloop.toml)
//! 4. Flat environment variables (MAX_RETRIES, MODEL_NAME, OLLAMA_MODE, ...)
//! 5. Prefixed environment variables (DOCLOOP_AGENT__MAX_RETRIES -> agent.max_retries)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{DocError, Result};

/// Flat variable names accepted for compatibility with plain `.env` setups
const FLAT_ENV_KEYS: &[(&str, &str)] = &[
    ("max_retries", "agent.max_retries"),
    ("retry_delay", "agent.retry_delay"),
    ("critique_threshold", "agent.critique_threshold"),
    ("enable_caching", "agent.enable_caching"),
    ("cache_dir", "agent.cache_dir"),
    ("cache_max_age_hours", "agent.cache_max_age_hours"),
    ("cache_max_entries", "agent.cache_max_entries"),
    ("api_timeout", "agent.api_timeout"),
    ("model_name", "llm.model"),
    ("ollama_mode", "llm.mode"),
    ("ollama_api_url", "llm.api_url"),
    ("ollama_api_key", "llm.api_key"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Self::files_figment();
        figment = figment
            .merge(Self::flat_env())
            .merge(Env::prefixed("DOCLOOP_").split("__").lowercase(true));

        Self::extract(figment)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::extract(figment)
    }

    /// Defaults merged with whichever config files exist
    fn files_figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment
    }

    fn flat_env() -> Env {
        let names: Vec<&'static str> = FLAT_ENV_KEYS.iter().map(|(name, _)| *name).collect();
        Env::raw().only(&names).map(|key| {
            let lowered = key.as_str().to_ascii_lowercase();
            FLAT_ENV_KEYS
                .iter()
                .find(|(name, _)| *name == lowered)
                .map(|(_, path)| (*path).into())
                .unwrap_or_else(|| lowered.into())
        })
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docloop/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docloop"))
            .or_else(|| {
                directories::ProjectDirs::from("", "", "docloop")
                    .map(|dirs| dirs.config_dir().to_path_buf())
            })
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".docloop.toml")
    }

    /// Render the effective configuration as TOML (secrets omitted)
    pub fn render(config: &Config) -> Result<String> {
        toml::to_string_pretty(config).map_err(|e| DocError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[agent]
max_retries = 5
critique_threshold = 0.6

[llm]
mode = "local"
model = "llama3"
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.agent.max_retries, 5);
        assert_eq!(config.agent.critique_threshold, 0.6);
        assert_eq!(config.agent.retry_delay, 2);
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.endpoint(), crate::constants::gateway::LOCAL_ENDPOINT);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_threshold() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\ncritique_threshold = 2.0").unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, DocError::Config(_)));
    }

    #[test]
    fn test_load_from_file_rejects_negative_retries() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\nmax_retries = -1").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_override() {
        // SAFETY: no other test reads this variable
        unsafe {
            std::env::set_var("DOCLOOP_GENERATION__MAX_FILES", "7");
        }
        let config = ConfigLoader::load().unwrap();
        assert_eq!(config.generation.max_files, 7);
        unsafe {
            std::env::remove_var("DOCLOOP_GENERATION__MAX_FILES");
        }
    }

    #[test]
    fn test_render_is_toml() {
        let rendered = ConfigLoader::render(&Config::default()).unwrap();
        assert!(rendered.contains("[agent]"));
        assert!(rendered.contains("critique_threshold = 0.8"));
    }
}
