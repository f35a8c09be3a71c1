//! Text-Generation Provider Abstraction
//!
//! Defines the [`LlmProvider`] trait for the external generator. A provider
//! performs exactly one request per call; retries, backoff, timeouts and
//! caching live in [`crate::ai::GenerationGateway`].

mod ollama;

pub use ollama::OllamaProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::Result;

/// Shared provider handle injected into the gateway.
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the raw generated text.
    ///
    /// Failures should be [`crate::types::DocError::Llm`] with a category so
    /// the gateway can tell retryable faults from fatal ones.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Create the shared provider described by configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    Ok(Arc::new(OllamaProvider::new(config)?))
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::types::DocError;

    /// Provider that replays a fixed script of outcomes and records prompts.
    pub struct ScriptedProvider {
        script: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
        instants: Mutex<Vec<tokio::time::Instant>>,
    }

    impl ScriptedProvider {
        pub fn new(script: Vec<Result<String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                prompts: Mutex::new(Vec::new()),
                instants: Mutex::new(Vec::new()),
            }
        }

        pub fn replies<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(replies.into_iter().map(|r| Ok(r.into())).collect())
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn instants(&self) -> Vec<tokio::time::Instant> {
            self.instants.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str, _model: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.instants.lock().unwrap().push(tokio::time::Instant::now());
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| {
                Err(DocError::Llm(LlmError::new(
                    ErrorCategory::Unknown,
                    "script exhausted",
                )))
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }
}
