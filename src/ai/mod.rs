//! AI Integration Layer
//!
//! Everything between the documentation cycle and the external generator:
//! the provider, the response cache, the retrying gateway and the prompts.

pub mod cache;
pub mod gateway;
pub mod prompt;
pub mod provider;
pub mod timeout;

pub use cache::{CacheConfig, CacheRecord, CacheStats, PruneReport, ResponseCache};
pub use gateway::{GatewayStats, GenerationGateway, RetryPolicy};
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates, clean_markdown_response};
pub use provider::{
    ErrorCategory, ErrorClassifier, LlmError, LlmProvider, OllamaProvider, SharedProvider,
    create_provider,
};
pub use timeout::with_timeout;
