//! HTTP backend for the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{BackendError, GenerativeBackend, SamplingParams};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-pro";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Generative backend over the Gemini REST API.
///
/// Every call is bounded by a 30 s timeout; a timeout surfaces as
/// [`BackendError::Timeout`] and is degraded by the judgment layer exactly
/// like a parse failure.
pub struct HttpGenerativeBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpGenerativeBackend {
    /// Create a backend for the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from environment: `GEMINI_API_KEY` (required), `GEMINI_MODEL`
    /// (defaults to [`DEFAULT_MODEL`]).
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| BackendError::Config("GEMINI_API_KEY not set".to_string()))?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }

    /// Override the base URL (for tests against a stub server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn request_body(prompt: &str, params: Option<&SamplingParams>) -> Value {
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        if let Some(p) = params {
            body["generationConfig"] = json!({
                "temperature": p.temperature,
                "maxOutputTokens": p.max_output_tokens,
                "topP": p.top_p,
                "topK": p.top_k,
            });
        }
        body
    }
}

#[async_trait]
impl GenerativeBackend for HttpGenerativeBackend {
    async fn generate(&self, prompt: &str, params: Option<&SamplingParams>) -> Result<String, BackendError> {
        let body = Self::request_body(prompt, params);

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Transport(e.to_string())
            }
        })?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(BackendError::MalformedResponse)
    }
}
