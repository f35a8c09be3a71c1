//! Generation Gateway
//!
//! Single entry point for every call to the external generator.
//!
//! ## Strategy
//!
//! 1. Consult the response cache; a hit returns with no network activity
//! 2. Call the provider under the per-call timeout
//! 3. On a retryable failure (timeout, malformed or empty response, network),
//!    sleep `retry_delay * 2^attempt` and try again
//! 4. On success, trim the text, store it in the cache and return it
//!
//! Auth and bad-request failures stop immediately. Backoff sleeps are not
//! cancellable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::cache::ResponseCache;
use super::provider::SharedProvider;
use super::timeout::with_timeout;
use crate::config::AgentConfig;
use crate::types::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};

/// Retry and timeout settings for one gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Configured attempt budget; 0 is treated as a single attempt
    pub max_retries: u32,
    /// Backoff base
    pub retry_delay: Duration,
    /// Deadline for each provider call
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_agent(agent: &AgentConfig) -> Self {
        Self {
            max_retries: agent.max_retries,
            retry_delay: agent.retry_delay(),
            timeout: agent.api_timeout(),
        }
    }

    /// Number of provider calls made before giving up
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Sleep before the retry that follows failed attempt `attempt` (0-indexed)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(1u32 << attempt.min(31))
    }
}

/// Snapshot of gateway counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub calls: u64,
    pub cache_hits: u64,
    pub provider_requests: u64,
    pub retries: u64,
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    calls: AtomicU64,
    cache_hits: AtomicU64,
    provider_requests: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
}

/// Retrying, caching front for an [`crate::ai::LlmProvider`]
pub struct GenerationGateway {
    provider: SharedProvider,
    cache: Option<ResponseCache>,
    policy: RetryPolicy,
    counters: Counters,
}

impl GenerationGateway {
    pub fn new(provider: SharedProvider, cache: Option<ResponseCache>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            cache,
            policy,
            counters: Counters::default(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            calls: self.counters.calls.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            provider_requests: self.counters.provider_requests.load(Ordering::Relaxed),
            retries: self.counters.retries.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Generate text for `prompt`, retrying with exponential backoff.
    ///
    /// Fails with [`DocError::Generation`] naming the attempt count and the
    /// last cause once the attempt budget is spent.
    #[instrument(skip_all, fields(model = %model, prompt_len = prompt.len()))]
    pub async fn call(&self, prompt: &str, model: &str) -> Result<String> {
        self.counters.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(prompt, model).await
        {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            info!("Using cached response");
            return Ok(hit);
        }

        let attempts = self.policy.attempts();
        let provider_name = self.provider.name().to_string();
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            self.counters.provider_requests.fetch_add(1, Ordering::Relaxed);
            debug!(attempt = attempt + 1, attempts, "Calling {}", provider_name);

            let outcome = with_timeout(
                self.policy.timeout,
                self.provider.generate(prompt, model),
                "generation request",
            )
            .await;

            let error = match outcome {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        if let Some(cache) = &self.cache {
                            cache.set(prompt, model, text).await;
                        }
                        return Ok(text.to_string());
                    }
                    LlmError::with_provider(
                        ErrorCategory::EmptyContent,
                        "Generator returned only whitespace",
                        provider_name.as_str(),
                    )
                }
                Err(err) => ErrorClassifier::classify_doc_error(&err, &provider_name),
            };

            if !error.is_retryable() {
                warn!(category = %error.category, "Non-retryable generation failure: {}", error.message);
                return Err(self.fail(attempt + 1, error));
            }

            if attempt + 1 < attempts {
                let delay = self.policy.backoff(attempt);
                warn!(
                    attempt = attempt + 1,
                    attempts,
                    category = %error.category,
                    "Generation attempt failed: {}. Retrying in {:?}",
                    error.message,
                    delay
                );
                self.counters.retries.fetch_add(1, Ordering::Relaxed);
                sleep(delay).await;
            } else {
                warn!(
                    attempt = attempt + 1,
                    attempts,
                    category = %error.category,
                    "Generation attempt failed: {}",
                    error.message
                );
            }

            last_error = Some(error);
        }

        let cause = last_error.unwrap_or_else(|| {
            LlmError::with_provider(ErrorCategory::Unknown, "no attempt made", provider_name)
        });
        Err(self.fail(attempts, cause))
    }

    fn fail(&self, attempts: u32, cause: LlmError) -> DocError {
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        DocError::Generation { attempts, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::cache::CacheConfig;
    use crate::ai::provider::testing::ScriptedProvider;
    use crate::ai::provider::LlmProvider;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn policy(max_retries: u32, delay_secs: u64) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            retry_delay: Duration::from_secs(delay_secs),
            timeout: Duration::from_secs(300),
        }
    }

    fn timeout_error() -> DocError {
        DocError::timeout("generation request", Duration::from_secs(300))
    }

    fn llm_error(category: ErrorCategory) -> DocError {
        DocError::Llm(LlmError::new(category, category.to_string()))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = policy(3, 2);
        assert_eq!(policy.backoff(0), Duration::from_secs(2));
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(8));
        assert_eq!(policy.attempts(), 3);
        assert_eq!(RetryPolicy { max_retries: 0, ..policy }.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_after_two_timeouts() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(timeout_error()),
            Err(timeout_error()),
            Ok("  generated docs \n".to_string()),
        ]));
        let gateway = GenerationGateway::new(provider.clone(), None, policy(3, 2));

        let text = gateway.call("prompt", "model").await.unwrap();
        assert_eq!(text, "generated docs");

        let instants = provider.instants();
        assert_eq!(instants.len(), 3);
        assert_eq!(instants[1] - instants[0], Duration::from_secs(2));
        assert_eq!(instants[2] - instants[1], Duration::from_secs(4));
        assert_eq!(gateway.stats().retries, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_names_attempts_and_cause() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(llm_error(ErrorCategory::Malformed)),
            Ok("   ".to_string()),
            Err(llm_error(ErrorCategory::EmptyContent)),
        ]));
        let gateway = GenerationGateway::new(provider.clone(), None, policy(3, 1));

        match gateway.call("prompt", "model").await {
            Err(DocError::Generation { attempts, cause }) => {
                assert_eq!(attempts, 3);
                assert_eq!(cause.category, ErrorCategory::EmptyContent);
            }
            other => panic!("expected generation error, got {:?}", other),
        }
        assert_eq!(provider.calls(), 3);
        assert_eq!(gateway.stats().failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(llm_error(ErrorCategory::Auth)),
            Ok("never reached".to_string()),
        ]));
        let gateway = GenerationGateway::new(provider.clone(), None, policy(3, 1));

        let err = gateway.call("prompt", "model").await.unwrap_err();
        assert!(matches!(err, DocError::Generation { attempts: 1, .. }));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_still_attempts_once() {
        let provider = Arc::new(ScriptedProvider::replies(["ok"]));
        let gateway = GenerationGateway::new(provider.clone(), None, policy(0, 1));
        assert_eq!(gateway.call("p", "m").await.unwrap(), "ok");
        assert_eq!(provider.calls(), 1);
    }

    struct HangingProvider;

    #[async_trait]
    impl LlmProvider for HangingProvider {
        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String> {
            sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &str {
            "hanging"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_call_timeout_is_enforced() {
        let policy = RetryPolicy {
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        };
        let gateway = GenerationGateway::new(Arc::new(HangingProvider), None, policy);

        let start = tokio::time::Instant::now();
        let err = gateway.call("p", "m").await.unwrap_err();
        match err {
            DocError::Generation { attempts, cause } => {
                assert_eq!(attempts, 2);
                assert_eq!(cause.category, ErrorCategory::Timeout);
            }
            other => panic!("expected generation error, got {:?}", other),
        }
        // two 5s timeouts plus one 1s backoff
        assert_eq!(start.elapsed(), Duration::from_secs(11));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::new(CacheConfig {
            cache_dir: dir.path().to_path_buf(),
            max_age: Duration::from_secs(3600),
            max_entries: 10,
        });
        let provider = Arc::new(ScriptedProvider::replies(["  first answer  "]));
        let gateway = GenerationGateway::new(provider.clone(), Some(cache), policy(3, 0));

        assert_eq!(gateway.call("p", "m").await.unwrap(), "first answer");
        assert_eq!(gateway.call("p", "m").await.unwrap(), "first answer");

        assert_eq!(provider.calls(), 1);
        let stats = gateway.stats();
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.cache_hits, 1);
    }
}
