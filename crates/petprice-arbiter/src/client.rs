//! HTTP client for an Ollama-compatible `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::ArbiterError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "qwen2.5:latest";
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A prompt-in, text-out generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` and returns the raw generated text.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError`] on transport, status or decoding failures.
    async fn generate(&self, prompt: &str) -> Result<String, ArbiterError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Non-streaming client for a local Ollama server.
///
/// Use [`OllamaClient::new`] for the default local endpoint or
/// [`OllamaClient::with_base_url`] to point at another host or a mock server.
pub struct OllamaClient {
    client: Client,
    base_url: Url,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    /// Creates a client for the default local endpoint and model.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new() -> Result<Self, ArbiterError> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE)
    }

    /// Creates a client for `base_url` using `model` at `temperature`.
    ///
    /// No request timeout is set here; callers bound each call themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ArbiterError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        model: &str,
        temperature: f32,
    ) -> Result<Self, ArbiterError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent("petprice/0.1 (candidate-arbiter)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ArbiterError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            model: model.to_owned(),
            temperature,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> Result<Url, ArbiterError> {
        self.base_url
            .join("api/generate")
            .map_err(|e| ArbiterError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ArbiterError> {
        let url = self.generate_url()?;
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response = self.client.post(url.clone()).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ArbiterError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ArbiterError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised_with_trailing_slash() {
        let client = OllamaClient::with_base_url("http://localhost:11434/", "m", 0.1)
            .expect("client construction should not fail");
        assert_eq!(
            client.generate_url().unwrap().as_str(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn base_url_with_path_prefix_keeps_prefix() {
        let client = OllamaClient::with_base_url("http://gateway.local/ollama", "m", 0.1)
            .expect("client construction should not fail");
        assert_eq!(
            client.generate_url().unwrap().as_str(),
            "http://gateway.local/ollama/api/generate"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OllamaClient::with_base_url("not a url", "m", 0.1);
        assert!(matches!(result, Err(ArbiterError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateRequest {
            model: "qwen2.5:latest",
            prompt: "pick one",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        })
        .unwrap();
        assert_eq!(body["model"], "qwen2.5:latest");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.5);
    }
}
