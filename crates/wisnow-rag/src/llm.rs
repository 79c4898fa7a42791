//! LLM Client implementations
//!
//! Provides a client for the Gemini `generateContent` API. One prompt in,
//! one answer out; no streaming and no conversation memory.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wisnow_core::{LlmClient, LlmConfig, Result, WisnowError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// Gemini Client
// ============================================================================

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client with default generation settings
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = LlmConfig::default();
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }

    /// Create from config
    ///
    /// A missing API key is allowed here so the server can start; every
    /// `generate` call then fails as backend-unavailable.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WisnowError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            WisnowError::BackendUnavailable("GEMINI_API_KEY not configured".to_string())
        })?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WisnowError::BackendUnavailable("Gemini request timed out".to_string())
                } else {
                    WisnowError::BackendUnavailable(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(WisnowError::BackendUnavailable(format!(
                "Gemini error {status}: {error_text}"
            )));
        }

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            WisnowError::BackendUnavailable(format!("Failed to parse response: {e}"))
        })?;

        extract_text(result)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| WisnowError::BackendUnavailable("No response generated".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(WisnowError::BackendUnavailable(format!(
            "Empty response (finish reason: {reason})"
        )));
    }

    Ok(text)
}

// ============================================================================
// Tests
// ============================================================================
