//! Ollama Generation Provider
//!
//! Non-streaming `/api/generate` client for local or cloud Ollama.
//! The generated text is read from the `response` key, falling back to
//! `text`; an absent or blank value is an [`ErrorCategory::EmptyContent`]
//! failure so the gateway retries it.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{ErrorCategory, ErrorClassifier, LlmError, LlmProvider};
use crate::config::LlmConfig;
use crate::constants::gateway;
use crate::types::{DocError, Result};

const PROVIDER_NAME: &str = "ollama";

/// Ollama `/api/generate` provider
pub struct OllamaProvider {
    endpoint: url::Url,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let endpoint = Self::validate_endpoint(config.endpoint())?;

        // Per-call deadlines are applied by the gateway
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(gateway::CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            api_key: config
                .api_key
                .as_deref()
                .filter(|key| !key.is_empty())
                .map(|key| SecretString::from(key.to_string())),
            client,
        })
    }

    /// Only allows http/https schemes and warns for remote plain-http endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<url::Url> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            DocError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DocError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if url.scheme() == "http"
            && let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
        {
            warn!(
                "Ollama endpoint {} is remote and unencrypted. Ensure this is intentional.",
                host
            );
        }

        Ok(url)
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    fn tags_url(&self) -> Result<url::Url> {
        self.endpoint
            .join("/api/tags")
            .map_err(|e| DocError::Config(format!("Cannot derive tags URL: {}", e)))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        let category = if err.is_timeout() {
            ErrorCategory::Timeout
        } else if err.is_connect() || err.is_request() {
            ErrorCategory::Network
        } else if err.is_decode() || err.is_body() {
            ErrorCategory::Malformed
        } else {
            ErrorCategory::Unknown
        };
        let message = if err.is_connect() {
            format!(
                "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                self.endpoint
            )
        } else {
            format!("Ollama request failed: {}", err)
        };
        LlmError::with_provider(category, message, PROVIDER_NAME)
    }
}

/// Pull the generated text out of a decoded response body
pub fn extract_text(body: &Value) -> Option<&str> {
    gateway::TEXT_KEYS
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String> {
        info!("Generating with Ollama (model: {})", model);

        let start_time = Instant::now();
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        debug!("Sending request to {}", self.endpoint);

        let response = self
            .request(self.client.post(self.endpoint.clone()))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                PROVIDER_NAME,
            )
            .into());
        }

        let decoded: Value = serde_json::from_str(&body).map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Malformed,
                format!("Failed to parse Ollama response: {}", e),
                PROVIDER_NAME,
            )
        })?;

        match extract_text(&decoded) {
            Some(text) => {
                debug!(
                    "Received {} chars from Ollama in {:?}",
                    text.len(),
                    start_time.elapsed()
                );
                Ok(text.to_string())
            }
            None => {
                let detail = decoded
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("response carried no text");
                Err(LlmError::with_provider(
                    ErrorCategory::EmptyContent,
                    format!("Empty response from Ollama: {}", detail),
                    PROVIDER_NAME,
                )
                .into())
            }
        }
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn health_check(&self) -> Result<bool> {
        let url = self.tags_url()?;

        match self.request(self.client.get(url)).send().await {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<TagsResponse>().await {
                    Ok(tags) => {
                        let names: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
                        info!("Ollama is available ({} models)", names.len());
                        debug!("Available models: {}", names.join(", "));
                    }
                    Err(_) => info!("Ollama is available"),
                }
                Ok(true)
            }
            Ok(resp) => {
                warn!("Ollama API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama not available: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}
