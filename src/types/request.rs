//! Verification request types.

use serde::{Deserialize, Serialize};

/// A (client requirement, submission) pair awaiting verification.
///
/// Immutable once received. Wire field names follow the public API
/// (`clientDescription` / `freelancerSubmission`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// What the client asked for, in the client's own words.
    #[serde(default)]
    pub client_description: String,
    /// The freelancer's submitted work product.
    #[serde(default)]
    pub freelancer_submission: String,
}

impl VerificationRequest {
    /// Create a request from owned parts.
    pub fn new(client_description: impl Into<String>, freelancer_submission: impl Into<String>) -> Self {
        Self {
            client_description: client_description.into(),
            freelancer_submission: freelancer_submission.into(),
        }
    }

    /// Reject requests with a missing or blank field before they reach the
    /// cache or the upstream backend.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_description.trim().is_empty() || self.freelancer_submission.trim().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(())
    }
}

/// Validation failure for an inbound request. Surfaced as HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or both request fields are absent or blank.
    #[error("Missing required fields")]
    MissingFields,
}
