//! docloop - Self-Refining Documentation Generator
//!
//! Drafts documentation for a codebase with a text generator, then loops:
//! the generator critiques its own draft, the critique is scored, the draft
//! is cross-validated against the real code, and either the draft is
//! accepted or it is refined and critiqued again.
//!
//! ## Core Features
//!
//! - **Generation Gateway**: retry with exponential backoff, per-call
//!   timeouts and a file-backed response cache
//! - **Code Element Index**: functions, classes and imports extracted from
//!   Python (tree-sitter) and JavaScript/TypeScript (pattern based)
//! - **Cross Validation**: documented names vs. indexed names, plus
//!   architecture and cross-file checks against the import graph
//! - **Semantic Scoring**: five quality aspects read from critique text
//!
//! ## Quick Start
//!
//! ```ignore
//! use docloop::{CycleController, DocumentationAgent, ProjectSource, ScoreCombiner};
//!
//! let controller = CycleController::new(source, gateway, "llama3.2", ScoreCombiner::new(0.8)?)?;
//! let outcome = controller.run(3).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: generation provider, gateway, response cache, prompts
//! - [`analyzer`]: file discovery, element extraction, the element index,
//!   import graph and architecture patterns
//! - [`verifier`]: cross validation of documents against the index
//! - [`critique`]: semantic scoring and the acceptance decision
//! - [`cycle`]: the draft/critique/refine state machine

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod critique;
pub mod cycle;
pub mod types;
pub mod verifier;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader, OutputFormat};
pub use types::{DocError, ErrorCategory, Result};

pub use ai::{
    GenerationGateway, LlmProvider, OllamaProvider, ResponseCache, RetryPolicy, with_timeout,
};
pub use analyzer::{CodeElementIndex, ExtractorRegistry, ProjectType, SourceFile};
pub use critique::{Decision, ScoreCombiner, SemanticScorer};
pub use cycle::{CycleController, DocumentationAgent, ProjectSource, RunOutcome, RunStatus};
pub use verifier::CrossValidator;
