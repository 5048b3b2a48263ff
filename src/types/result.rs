//! Verification result schema and model-output normalization.
//!
//! The result type is the one contract the gateway never breaks: whatever the
//! upstream model returns (or fails to return), the caller receives a
//! well-formed `VerificationResult`. Malformed model output is coerced
//! field-by-field; hard failures become a negative result with an explanatory
//! message rather than an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on the explanation text. The prompt asks the model for at most
/// 200 words; this bounds pathological replies at the schema level.
pub const MAX_EXPLANATION_CHARS: usize = 2000;

/// Assessment of a single extracted requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCheck {
    /// The requirement as extracted from the client description.
    pub requirement: String,
    /// Whether the submission satisfies it.
    pub met: bool,
    /// Brief justification.
    pub explanation: String,
}

/// Structured judgment over a (client requirement, submission) pair.
///
/// Always well-formed: every field has a safe empty/false default, and
/// [`VerificationResult::failure`] produces the degraded form used when the
/// upstream call or parse fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Overall approve/reject decision.
    pub is_approved: bool,
    /// Detailed explanation of the decision (bounded length).
    pub explanation: String,
    /// Salient observations about the submission.
    pub key_points: Vec<String>,
    /// Overall quality in [0, 100].
    pub quality_score: f64,
    /// Per-requirement assessments.
    pub requirements_met: Vec<RequirementCheck>,
}

impl VerificationResult {
    /// Safe default result representing a verification that could not be
    /// completed. Negative but well-formed, never an error.
    pub fn failure(explanation: impl Into<String>) -> Self {
        Self {
            is_approved: false,
            explanation: truncate_chars(explanation.into(), MAX_EXPLANATION_CHARS),
            key_points: vec!["Verification failed".to_string()],
            quality_score: 0.0,
            requirements_met: Vec::new(),
        }
    }

    /// Build a result from raw model output, coercing each field to the
    /// schema: missing/non-boolean `is_approved` becomes `false`, non-numeric
    /// `quality_score` becomes 0, non-array sequences become empty.
    pub fn from_model_value(value: &Value) -> Self {
        let is_approved = value.get("is_approved").and_then(Value::as_bool).unwrap_or(false);

        let explanation = value
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let key_points = value
            .get("key_points")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();

        let quality_score = value
            .get("quality_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);

        let requirements_met = value
            .get("requirements_met")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(RequirementCheck::from_model_value).collect())
            .unwrap_or_default();

        Self {
            is_approved,
            explanation: truncate_chars(explanation, MAX_EXPLANATION_CHARS),
            key_points,
            quality_score,
            requirements_met,
        }
    }
}

impl RequirementCheck {
    fn from_model_value(value: &Value) -> Self {
        Self {
            requirement: value
                .get("requirement")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            met: value.get("met").and_then(Value::as_bool).unwrap_or(false),
            explanation: value
                .get("explanation")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Truncate on a char boundary without allocating when already short enough.
fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}
