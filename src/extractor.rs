//! Requirement extraction from client descriptions.

use std::sync::Arc;

use serde_json::Value;

use crate::backend::GenerativeBackend;
use crate::prompt;

/// Extracts a requirement list from a client description via the backend.
///
/// Extraction failure is non-fatal by contract: any backend error, parse
/// failure or non-array reply yields an empty list and never propagates.
pub struct RequirementExtractor<B> {
    backend: Arc<B>,
}

impl<B: GenerativeBackend> RequirementExtractor<B> {
    /// Create an extractor over the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Extract requirement strings, or an empty list on any failure.
    pub async fn extract(&self, client_description: &str) -> Vec<String> {
        let prompt = prompt::extraction_prompt(client_description);

        let reply = match self.backend.generate(&prompt, None).await {
            Ok(text) => text,
            Err(error) => {
                tracing::debug!(error = %error, "requirement extraction call failed");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&reply) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Ok(_) => {
                tracing::debug!("extraction reply was not a JSON array");
                Vec::new()
            }
            Err(error) => {
                tracing::debug!(error = %error, "extraction reply was not valid JSON");
                Vec::new()
            }
        }
    }
}
