pub mod draft;
pub mod element;
pub mod error;
pub mod issue;
pub mod score;

pub use draft::{DocumentationDraft, IterationMetric};
pub use element::{CodeElement, ElementKind};
pub use error::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use issue::{IssueCounts, IssueSeverity, IssueType, ValidationIssue};
pub use score::{Aspect, SemanticScore, unit_clamp};
