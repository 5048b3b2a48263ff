//! Verification pipeline orchestration.
//!
//! Per-request flow:
//!
//! ```text
//! RECEIVED → ADMITTED | REJECTED(rate-limit)
//!          → CACHE_HIT(done) | CACHE_MISS
//!          → EXTRACTING → EXTRACTED | EXTRACT_FAILED(empty)
//!          → JUDGING → JUDGED | JUDGE_FAILED(default result)
//!          → CACHED → RETURNED
//! ```

use std::sync::Arc;

use crate::admission::{AdmissionConfig, AdmissionController};
use crate::backend::GenerativeBackend;
use crate::cache::{CacheConfig, ResultCache};
use crate::extractor::RequirementExtractor;
use crate::fingerprint::Fingerprint;
use crate::judge::JudgmentGenerator;
use crate::types::{ValidationError, VerificationRequest, VerificationResult};

/// Configuration for the verification pipeline.
#[derive(Debug, Clone, Default)]
pub struct VerifierConfig {
    /// Admission controller settings.
    pub admission: AdmissionConfig,
    /// Result cache settings.
    pub cache: CacheConfig,
}

/// Failures surfaced to the HTTP layer. Everything downstream of admission is
/// absorbed into the result itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Admission control rejected the request. Surfaced as HTTP 429.
    #[error("Rate limit exceeded. Please try again in a minute.")]
    AdmissionRejected,
    /// The request failed field validation. Surfaced as HTTP 400.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The verification pipeline: admission control, cache, extraction, judgment.
pub struct TaskVerifier<B> {
    admission: AdmissionController,
    cache: ResultCache,
    extractor: RequirementExtractor<B>,
    judge: JudgmentGenerator<B>,
}

impl<B: GenerativeBackend> TaskVerifier<B> {
    /// Create a verifier over the given backend.
    pub fn new(backend: Arc<B>, config: VerifierConfig) -> Self {
        Self {
            admission: AdmissionController::new(config.admission),
            cache: ResultCache::new(config.cache),
            extractor: RequirementExtractor::new(Arc::clone(&backend)),
            judge: JudgmentGenerator::new(backend),
        }
    }

    /// Run the pipeline for one request.
    ///
    /// Validation and admission happen before the cache is consulted; a
    /// rejected request makes no upstream call. Past admission the call
    /// cannot fail: a cache hit returns the stored result, a miss computes
    /// one (degraded to the safe default on upstream failure) and stores it.
    pub async fn verify(&self, request: &VerificationRequest) -> Result<Arc<VerificationResult>, VerifyError> {
        request.validate()?;

        if !self.admission.allow() {
            tracing::info!("request rejected by admission control");
            return Err(VerifyError::AdmissionRejected);
        }

        let key = Fingerprint::of(request);
        tracing::debug!(fingerprint = %key, "request admitted");

        let result = self
            .cache
            .get_or_compute(key, || async move {
                let requirements = self.extractor.extract(&request.client_description).await;
                tracing::debug!(count = requirements.len(), "requirements extracted");
                self.judge
                    .judge(
                        &request.client_description,
                        &request.freelancer_submission,
                        &requirements,
                    )
                    .await
            })
            .await;

        Ok(result)
    }

    /// Number of results currently cached.
    pub fn cache_entries(&self) -> usize {
        self.cache.len()
    }

    /// Requests admitted within the current rate window.
    pub fn requests_in_window(&self) -> usize {
        self.admission.in_window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use std::time::Duration;

    const APPROVED_REPLY: &str = r#"{
        "is_approved": true,
        "explanation": "Looks good",
        "key_points": [],
        "quality_score": 80,
        "requirements_met": []
    }"#;

    fn verifier(backend: Arc<ScriptedBackend>, limit: usize) -> TaskVerifier<ScriptedBackend> {
        TaskVerifier::new(
            backend,
            VerifierConfig {
                admission: AdmissionConfig {
                    limit,
                    window: Duration::from_secs(60),
                },
                cache: CacheConfig::default(),
            },
        )
    }

    #[tokio::test]
    async fn test_miss_extracts_then_judges() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text(r#"["requirement one"]"#);
        backend.push_text(APPROVED_REPLY);

        let verifier = verifier(Arc::clone(&backend), 60);
        let request = VerificationRequest::new("Build a login page", "Here is the login page code...");

        let result = verifier.verify(&request).await.unwrap();
        assert!(result.is_approved);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_repeat_request_hits_cache() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text("[]");
        backend.push_text(APPROVED_REPLY);

        let verifier = verifier(Arc::clone(&backend), 60);
        let request = VerificationRequest::new("Build a login page", "Here is the login page code...");

        let first = verifier.verify(&request).await.unwrap();
        let second = verifier.verify(&request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.calls(), 2, "second request must not reach the backend");
        assert_eq!(verifier.cache_entries(), 1);
    }

    #[tokio::test]
    async fn test_rejected_request_makes_no_upstream_call() {
        let backend = Arc::new(ScriptedBackend::new());
        let verifier = verifier(Arc::clone(&backend), 0);
        let request = VerificationRequest::new("desc", "work");

        let err = verifier.verify(&request).await.unwrap_err();
        assert_eq!(err, VerifyError::AdmissionRejected);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_cache_or_backend() {
        let backend = Arc::new(ScriptedBackend::new());
        let verifier = verifier(Arc::clone(&backend), 60);
        let request = VerificationRequest::new("", "");

        let err = verifier.verify(&request).await.unwrap_err();
        assert_eq!(err, VerifyError::Validation(ValidationError::MissingFields));
        assert_eq!(backend.calls(), 0);
        assert_eq!(verifier.cache_entries(), 0);
        // Validation happens before admission, so the window stays empty too.
        assert_eq!(verifier.requests_in_window(), 0);
    }

    #[tokio::test]
    async fn test_extract_failure_still_judges() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text("not json at all");
        backend.push_text(APPROVED_REPLY);

        let verifier = verifier(Arc::clone(&backend), 60);
        let request = VerificationRequest::new("desc", "work");

        let result = verifier.verify(&request).await.unwrap();
        assert!(result.is_approved);
    }

    #[tokio::test]
    async fn test_upstream_garbage_yields_negative_result_not_error() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_text("[]");
        backend.push_text("<html>502 Bad Gateway</html>");

        let verifier = verifier(Arc::clone(&backend), 60);
        let request = VerificationRequest::new("desc", "work");

        let result = verifier.verify(&request).await.unwrap();
        assert!(!result.is_approved);
        assert!(!result.explanation.is_empty());
    }
}
