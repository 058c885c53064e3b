//! External answer generation.
//!
//! Defines the [`Generator`] trait and the one concrete backend:
//! - **[`OpenAIGenerator`]**: calls an OpenAI-compatible
//!   `POST /v1/chat/completions` endpoint with retry and backoff.
//!
//! Generation is optional. [`create_generator`] returns `None` when the
//! provider is disabled or no credential is configured, and callers treat
//! `None` exactly like a failed call: they fall back to the built-in answer.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, ... (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::GenerationConfig;

/// Produces answer text from a fully built prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Instantiate the configured generator, if it can run at all.
pub fn create_generator(config: &GenerationConfig) -> Result<Option<Arc<dyn Generator>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "openai" => match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                let generator = OpenAIGenerator::new(config, key)?;
                info!(model = generator.model_name(), "external generation enabled");
                Ok(Some(Arc::new(generator)))
            }
            _ => {
                info!(
                    env = %config.api_key_env,
                    "no generation credential set; answers use built-in assembly"
                );
                Ok(None)
            }
        },
        other => bail!("Unknown generation provider: {}", other),
    }
}

// ============ OpenAI Generator ============

pub struct OpenAIGenerator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAIGenerator {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/v1/chat/completions", config.url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying generation request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_chat_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(anyhow::anyhow!(
                            "generation API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    bail!("generation API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("generation failed after retries")))
    }
}

/// Extracts `choices[0].message.content`, rejecting blank answers.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing choices[0].message.content"))?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        bail!("generation returned an empty answer");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_provider_has_no_generator() {
        let config = GenerationConfig::default();
        assert!(create_generator(&config).unwrap().is_none());
    }

    #[test]
    fn test_missing_credential_has_no_generator() {
        let config = GenerationConfig {
            provider: "openai".to_string(),
            api_key_env: "ANSWER_HARNESS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..GenerationConfig::default()
        };
        assert!(create_generator(&config).unwrap().is_none());
    }

    #[test]
    fn test_unknown_provider_errors() {
        let config = GenerationConfig {
            provider: "carrier-pigeon".to_string(),
            ..GenerationConfig::default()
        };
        assert!(create_generator(&config).is_err());
    }

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Use the setup wizard.\n" } }]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "Use the setup wizard.");
    }

    #[test]
    fn test_parse_chat_response_rejects_missing_or_blank() {
        assert!(parse_chat_response(&serde_json::json!({})).is_err());
        let blank = serde_json::json!({ "choices": [{ "message": { "content": "   " } }] });
        assert!(parse_chat_response(&blank).is_err());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = GenerationConfig {
            url: "http://localhost:8080/".to_string(),
            ..GenerationConfig::default()
        };
        let g = OpenAIGenerator::new(&config, "k".to_string()).unwrap();
        assert_eq!(g.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves `/v1/chat/completions`, failing with `fail_status` for the first
    /// `failures` requests. Returns the base URL and the request counter.
    async fn chat_server(fail_status: StatusCode, failures: usize) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = (Arc::clone(&hits), fail_status, failures);

        async fn handle(
            State((hits, fail_status, failures)): State<(Arc<AtomicUsize>, StatusCode, usize)>,
        ) -> (StatusCode, Json<serde_json::Value>) {
            let n = hits.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                (fail_status, Json(serde_json::json!({ "error": "try later" })))
            } else {
                (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "choices": [{ "message": { "content": "Use the setup wizard." } }]
                    })),
                )
            }
        }

        let app = Router::new()
            .route("/v1/chat/completions", post(handle))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), hits)
    }

    fn generator_for(url: String, max_retries: u32) -> OpenAIGenerator {
        let config = GenerationConfig {
            provider: "openai".to_string(),
            url,
            max_retries,
            timeout_secs: 5,
            ..GenerationConfig::default()
        };
        OpenAIGenerator::new(&config, "test-key".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_retries_after_server_error() {
        let (url, hits) = chat_server(StatusCode::SERVICE_UNAVAILABLE, 1).await;
        let text = generator_for(url, 2).generate("prompt").await.unwrap();
        assert_eq!(text, "Use the setup wizard.");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_after_rate_limit() {
        let (url, hits) = chat_server(StatusCode::TOO_MANY_REQUESTS, 1).await;
        assert!(generator_for(url, 1).generate("prompt").await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_fails_without_retry() {
        let (url, hits) = chat_server(StatusCode::BAD_REQUEST, usize::MAX).await;
        let err = generator_for(url, 2).generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("400"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (url, hits) = chat_server(StatusCode::BAD_GATEWAY, usize::MAX).await;
        let err = generator_for(url, 1).generate("prompt").await.unwrap_err();
        assert!(err.to_string().contains("502"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
