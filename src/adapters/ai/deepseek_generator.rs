//! DeepSeek Generator - Implementation of TextGenerator for DeepSeek's API.
//!
//! Talks to the OpenAI-compatible chat completions endpoint.
//!
//! # Configuration
//!
//! ```ignore
//! let config = DeepSeekConfig::new(api_key)
//!     .with_model("deepseek-chat")
//!     .with_base_url("https://api.deepseek.com/v1");
//!
//! let generator = DeepSeekGenerator::new(config);
//! ```
//!
//! The generator performs no retries itself; failures are surfaced to the
//! caller, which decides whether to resubmit.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{GenerationContext, GeneratorError, TextGenerator};

/// Configuration for the DeepSeek generator.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "deepseek-chat").
    pub model: String,
    /// Base URL for the API (default: https://api.deepseek.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl DeepSeekConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "deepseek-chat".to_string(),
            base_url: "https://api.deepseek.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the completion token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// DeepSeek API generator implementation.
pub struct DeepSeekGenerator {
    config: DeepSeekConfig,
    client: Client,
}

impl DeepSeekGenerator {
    /// Creates a new DeepSeek generator with the given configuration.
    pub fn new(config: DeepSeekConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_api_request(&self, prompt: &str, ctx: &GenerationContext) -> DeepSeekRequest {
        DeepSeekRequest {
            model: self.config.model.clone(),
            messages: vec![DeepSeekMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            user: ctx.as_token(),
        }
    }

    async fn send_request(
        &self,
        prompt: &str,
        ctx: &GenerationContext,
    ) -> Result<Response, GeneratorError> {
        let api_request = self.to_api_request(prompt, ctx);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    GeneratorError::network(format!("Connection failed: {}", e))
                } else {
                    GeneratorError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, GeneratorError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(GeneratorError::AuthenticationFailed),
            429 => {
                let retry_after = Self::parse_retry_after(&error_body);
                Err(GeneratorError::rate_limited(retry_after))
            }
            400 => Err(GeneratorError::InvalidRequest(error_body)),
            500..=599 => Err(GeneratorError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(GeneratorError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(msg) = parsed.get("error").and_then(|e| e.get("message")) {
                if let Some(s) = msg.as_str() {
                    // "try again in Xs" pattern
                    if let Some(idx) = s.find("try again in ") {
                        let rest = &s[idx + 13..];
                        if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                            if let Ok(secs) = rest[..num_end].parse::<u32>() {
                                return secs;
                            }
                        }
                    }
                }
            }
        }
        30 // Default retry after
    }

    async fn parse_response(&self, response: Response) -> Result<String, GeneratorError> {
        let response = self.handle_response_status(response).await?;

        let api_response: DeepSeekResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GeneratorError::parse("No choices in response"))?;

        Ok(choice.message.content)
    }
}

#[async_trait]
impl TextGenerator for DeepSeekGenerator {
    async fn complete(
        &self,
        prompt: &str,
        ctx: &GenerationContext,
    ) -> Result<String, GeneratorError> {
        let response = self.send_request(prompt, ctx).await?;
        self.parse_response(response).await
    }
}

// ----- DeepSeek API Types -----

#[derive(Debug, Serialize)]
struct DeepSeekRequest {
    model: String,
    messages: Vec<DeepSeekMessage>,
    max_tokens: u32,
    temperature: f32,
    user: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekMessage,
}
