//! Prompt construction for the generative backend.
//!
//! Prompt text is part of the wire contract with the model: the judgment
//! prompt pins the exact JSON schema the parser expects.

/// Prompt asking the model for a JSON array of requirement strings.
pub fn extraction_prompt(client_description: &str) -> String {
    format!(
        "Extract specific requirements from this client description. \
         Return as a JSON array of strings:\n{client_description}"
    )
}

/// Prompt embedding both texts and the extracted requirement list, pinning
/// the `VerificationResult` JSON schema for the reply.
pub fn judgment_prompt(
    client_description: &str,
    freelancer_submission: &str,
    requirements: &[String],
) -> String {
    let requirements_json =
        serde_json::to_string_pretty(requirements).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Task Verification for Freelance Work:

Client Requirements:
{client_description}

Freelancer Submission:
{freelancer_submission}

Specific Requirements to Check:
{requirements_json}

Analyze the submission thoroughly and provide a detailed assessment. Consider:
1. Technical accuracy and completeness
2. Quality of work
3. Meeting of specific requirements
4. Professional standards
5. Potential improvements

Respond in this exact JSON format:
{{
    "is_approved": boolean,
    "explanation": "detailed explanation (max 200 words)",
    "key_points": ["point1", "point2", "point3"],
    "quality_score": number (0-100),
    "requirements_met": [
        {{
            "requirement": "specific requirement",
            "met": boolean,
            "explanation": "brief explanation"
        }}
    ]
}}"#
    )
}
