//! Generative backend abstraction.
//!
//! The gateway treats the model as a black box: a text prompt plus sampling
//! configuration goes in, free-form text expected to parse as JSON comes out.
//! Failures are typed so the judgment layer can distinguish timeout, transport
//! and malformed-payload cases while still degrading all of them to a safe
//! default result.

pub mod scripted;

#[cfg(feature = "http-backend")]
pub mod http;

use async_trait::async_trait;
use serde::Serialize;

/// Sampling configuration sent with a generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingParams {
    /// Randomness of the output distribution.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
    /// Nucleus sampling mass.
    pub top_p: f64,
    /// Top-k truncation.
    pub top_k: u32,
}

impl SamplingParams {
    /// Low-randomness settings used for verification judgments.
    pub fn judgment() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 500,
            top_p: 0.8,
            top_k: 40,
        }
    }
}

/// Failure modes of an upstream generation call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The call exceeded its deadline. Treated like a parse failure by the
    /// judgment layer.
    #[error("upstream call timed out")]
    Timeout,
    /// Connection-level failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Non-success HTTP status from the backend.
    #[error("upstream returned status {0}")]
    Status(u16),
    /// Response arrived but carried no generated text.
    #[error("upstream response missing generated text")]
    MalformedResponse,
    /// The backend cannot be constructed from its configuration.
    #[error("backend misconfigured: {0}")]
    Config(String),
}

/// A generative-AI backend.
///
/// `params` is `None` for calls that rely on the model's default sampling
/// (requirement extraction) and `Some` for judgment calls with fixed,
/// low-randomness settings.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Generate free-form text for a prompt.
    async fn generate(&self, prompt: &str, params: Option<&SamplingParams>) -> Result<String, BackendError>;
}

pub use scripted::ScriptedBackend;

#[cfg(feature = "http-backend")]
pub use http::HttpGenerativeBackend;
