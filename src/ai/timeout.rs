//! Per-call Timeouts
//!
//! Wraps a single async operation in a deadline. The gateway uses this to
//! bound each generation request by `api_timeout`; there is no run-wide
//! deadline.

use std::future::Future;
use std::time::Duration;

use crate::types::{DocError, Result};

/// Execute an async operation with a timeout
///
/// Returns [`DocError::Timeout`] if the operation doesn't complete within
/// `timeout`. The inner future is dropped on expiry.
///
/// ```ignore
/// let text = with_timeout(
///     Duration::from_secs(300),
///     provider.generate(prompt, model),
///     "generate",
/// ).await?;
/// ```
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DocError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DocError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_inner_error() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(DocError::Analysis("boom".to_string())) },
            "failing operation",
        )
        .await;
        assert!(matches!(result, Err(DocError::Analysis(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, DocError>(42)
            },
            "slow operation",
        )
        .await;
        match result {
            Err(DocError::Timeout { operation, duration }) => {
                assert_eq!(operation, "slow operation");
                assert_eq!(duration, Duration::from_millis(10));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
