//! Judgment generation against the verification result schema.
//!
//! This is the error-absorption boundary of the pipeline: timeouts, transport
//! failures, non-success statuses and unparseable replies are all degraded to
//! a safe default result. Verification failures never throw past `judge`.

use std::sync::Arc;

use serde_json::Value;

use crate::backend::{GenerativeBackend, SamplingParams};
use crate::prompt;
use crate::types::VerificationResult;

/// Generates a structured judgment for a submission via the backend.
pub struct JudgmentGenerator<B> {
    backend: Arc<B>,
}

impl<B: GenerativeBackend> JudgmentGenerator<B> {
    /// Create a generator over the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Judge a submission against the description and extracted requirements.
    ///
    /// Always returns a well-formed result; upstream failures become a
    /// negative result carrying the underlying cause in its explanation.
    pub async fn judge(
        &self,
        client_description: &str,
        freelancer_submission: &str,
        requirements: &[String],
    ) -> VerificationResult {
        let prompt = prompt::judgment_prompt(client_description, freelancer_submission, requirements);

        let reply = match self
            .backend
            .generate(&prompt, Some(&SamplingParams::judgment()))
            .await
        {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(error = %error, "judgment call failed");
                return VerificationResult::failure(format!("Error during verification: {error}"));
            }
        };

        match serde_json::from_str::<Value>(strip_code_fences(&reply)) {
            Ok(value @ Value::Object(_)) => VerificationResult::from_model_value(&value),
            Ok(_) => {
                tracing::warn!("judgment reply was valid JSON but not an object");
                VerificationResult::failure("Error in verification process")
            }
            Err(error) => {
                tracing::warn!(error = %error, "judgment reply was not valid JSON");
                VerificationResult::failure("Error in verification process")
            }
        }
    }
}

/// Models often wrap JSON replies in markdown fences; strip one layer.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ScriptedBackend};

    fn judge_with(backend: ScriptedBackend) -> JudgmentGenerator<ScriptedBackend> {
        JudgmentGenerator::new(Arc::new(backend))
    }

    const APPROVED_REPLY: &str = r#"{
        "is_approved": true,
        "explanation": "All requirements satisfied",
        "key_points": ["works"],
        "quality_score": 92,
        "requirements_met": []
    }"#;

    #[tokio::test]
    async fn test_parses_model_reply() {
        let backend = ScriptedBackend::new();
        backend.push_text(APPROVED_REPLY);

        let result = judge_with(backend).judge("desc", "work", &[]).await;
        assert!(result.is_approved);
        assert_eq!(result.quality_score, 92.0);
    }

    #[tokio::test]
    async fn test_fenced_reply_parses() {
        let backend = ScriptedBackend::new();
        backend.push_text(format!("```json\n{APPROVED_REPLY}\n```"));

        let result = judge_with(backend).judge("desc", "work", &[]).await;
        assert!(result.is_approved);
    }

    #[tokio::test]
    async fn test_non_json_reply_degrades() {
        let backend = ScriptedBackend::new();
        backend.push_text("I think this looks great overall!");

        let result = judge_with(backend).judge("desc", "work", &[]).await;
        assert!(!result.is_approved);
        assert_eq!(result.explanation, "Error in verification process");
        assert!(!result.explanation.is_empty());
    }

    #[tokio::test]
    async fn test_json_array_reply_degrades() {
        let backend = ScriptedBackend::new();
        backend.push_text(r#"["not", "an", "object"]"#);

        let result = judge_with(backend).judge("desc", "work", &[]).await;
        assert!(!result.is_approved);
    }

    #[tokio::test]
    async fn test_timeout_embeds_cause() {
        let backend = ScriptedBackend::new();
        backend.push_error(BackendError::Timeout);

        let result = judge_with(backend).judge("desc", "work", &[]).await;
        assert!(!result.is_approved);
        assert!(result.explanation.starts_with("Error during verification:"));
        assert!(result.explanation.contains("timed out"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }
}
