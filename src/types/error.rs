//! Unified Error Type System
//!
//! Centralized error types for the documentation loop.
//! Generation failures are classified so the gateway can decide whether a
//! retry makes sense.
//!
//! ## Error Categories
//!
//! - **Timeout**: The generation call exceeded its per-call budget (retry)
//! - **Network**: Connectivity issues (retry with backoff)
//! - **RateLimit / Unavailable**: Service pushing back (retry with backoff)
//! - **Malformed / EmptyContent**: Undecodable or empty response body (retry)
//! - **Auth / BadRequest**: Fail fast, the same request cannot succeed

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used by the gateway retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Call exceeded its timeout
    Timeout,
    /// Network/connectivity issues
    Network,
    /// Rate limited by the service
    RateLimit,
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Service unavailable or overloaded
    Unavailable,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Response body could not be decoded
    Malformed,
    /// Response decoded but carried no text
    EmptyContent,
    /// Unknown error - conservative retry
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Network => write!(f, "NETWORK"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Malformed => write!(f, "MALFORMED"),
            Self::EmptyContent => write!(f, "EMPTY_CONTENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category is worth another attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Auth | Self::BadRequest)
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Structured error from the text-generation service
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for retry decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport-level failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify HTTP status code directly
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            408 | 504 => LlmError::with_provider(ErrorCategory::Timeout, message, provider),
            500 | 502 | 503 => {
                LlmError::with_provider(ErrorCategory::Unavailable, message, provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Classify a [`DocError`] raised somewhere below the gateway
    pub fn classify_doc_error(err: &DocError, provider: &str) -> LlmError {
        match err {
            DocError::Llm(llm_err) => llm_err.clone(),
            DocError::Timeout { .. } => {
                LlmError::with_provider(ErrorCategory::Timeout, err.to_string(), provider)
            }
            DocError::Json(_) => {
                LlmError::with_provider(ErrorCategory::Malformed, err.to_string(), provider)
            }
            DocError::Io(_) => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            DocError::Config(_) => {
                LlmError::with_provider(ErrorCategory::BadRequest, err.to_string(), provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, err.to_string(), provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    /// Single failed call to the generation service
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Gateway gave up after exhausting its attempts
    #[error("Generation failed after {attempts} attempts: {cause}")]
    Generation { attempts: u32, cause: LlmError },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error in {path}: {message}")]
    Parse { message: String, path: String },

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Verification failed: {0}")]
    Verification(String),
}

impl From<LlmError> for DocError {
    fn from(err: LlmError) -> Self {
        DocError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DocError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl DocError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a parse error for a file
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            path: path.into(),
        }
    }

    /// True for errors that abort a documentation run
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Generation { .. } | Self::Llm(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_and_bad_request_are_not_retryable() {
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::BadRequest.is_retryable());
        assert!(ErrorCategory::Timeout.is_retryable());
        assert!(ErrorCategory::EmptyContent.is_retryable());
        assert!(ErrorCategory::Malformed.is_retryable());
    }

    #[test]
    fn test_classify_http_status() {
        let err = ErrorClassifier::classify_http_status(429, "slow down", "ollama");
        assert_eq!(err.category, ErrorCategory::RateLimit);

        let err = ErrorClassifier::classify_http_status(401, "nope", "ollama");
        assert_eq!(err.category, ErrorCategory::Auth);

        let err = ErrorClassifier::classify_http_status(503, "busy", "ollama");
        assert_eq!(err.category, ErrorCategory::Unavailable);
    }

    #[test]
    fn test_classify_timeout_error() {
        let err = DocError::timeout("generate", Duration::from_secs(5));
        let classified = ErrorClassifier::classify_doc_error(&err, "ollama");
        assert_eq!(classified.category, ErrorCategory::Timeout);
        assert_eq!(classified.provider.as_deref(), Some("ollama"));
    }

    #[test]
    fn test_generation_error_message_names_attempts() {
        let err = DocError::Generation {
            attempts: 3,
            cause: LlmError::new(ErrorCategory::EmptyContent, "empty response"),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("empty response"));
        assert!(err.is_generation_failure());
    }
}
