//! CLI Common Utilities
//!
//! Configuration loading and collaborator wiring shared by the commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ai::{CacheConfig, GenerationGateway, ResponseCache, RetryPolicy, create_provider};
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub quiet: bool,
}

impl CommandContext {
    /// Load configuration from `config_file`, or the full resolution chain
    pub fn load(config_file: Option<&Path>, quiet: bool) -> Result<Self> {
        let config = match config_file {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self { config, quiet })
    }

    pub fn cache(&self) -> ResponseCache {
        ResponseCache::new(CacheConfig::from_agent(&self.config.agent))
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.config.agent.cache_dir.clone()
    }

    /// Gateway over the configured provider; caching follows
    /// `enable_caching` unless `no_cache` is set
    pub fn gateway(&self, no_cache: bool) -> Result<Arc<GenerationGateway>> {
        let provider = create_provider(&self.config.llm)?;
        let cache = (self.config.agent.enable_caching && !no_cache).then(|| self.cache());
        Ok(Arc::new(GenerationGateway::new(
            provider,
            cache,
            RetryPolicy::from_agent(&self.config.agent),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file_and_gateway() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\nmax_retries = 5\nenable_caching = false").unwrap();

        let ctx = CommandContext::load(Some(file.path()), true).unwrap();
        assert_eq!(ctx.config.agent.max_retries, 5);

        let gateway = ctx.gateway(false).unwrap();
        assert_eq!(gateway.policy().max_retries, 5);
        assert_eq!(gateway.provider_name(), "ollama");
    }
}
