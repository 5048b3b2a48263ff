//! Axum routes for the verification gateway.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::backend::GenerativeBackend;
use crate::types::{VerificationRequest, VerificationResult};
use crate::verifier::VerifyError;

use super::middleware::record_verification;
use super::state::GatewayState;

/// Type alias for the gateway state with the live Gemini backend.
#[cfg(feature = "http-backend")]
pub type AppState = GatewayState<crate::backend::HttpGenerativeBackend>;

/// Error body returned on 400/429/500 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorBody {
    /// Create an error body from a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(error = %self.error, "request error");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Gateway health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, `"healthy"` when serving.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Number of cached verification results.
    pub cache_entries: usize,
}

fn verify_error_response(error: &VerifyError) -> (StatusCode, Json<ErrorBody>) {
    let status = match error {
        VerifyError::Validation(_) => StatusCode::BAD_REQUEST,
        VerifyError::AdmissionRejected => StatusCode::TOO_MANY_REQUESTS,
    };
    (status, Json(ErrorBody::new(error.to_string())))
}

/// Verify a (client requirement, submission) pair.
///
/// Always returns a parseable body: a well-formed `VerificationResult` on
/// success (including degraded negative results), or `{error}` for the
/// validation/rate-limit cases.
async fn verify_handler<B: GenerativeBackend + 'static>(
    State(state): State<Arc<GatewayState<B>>>,
    Json(request): Json<VerificationRequest>,
) -> Result<Json<VerificationResult>, (StatusCode, Json<ErrorBody>)> {
    let start = Instant::now();

    match state.verifier.verify(&request).await {
        Ok(result) => {
            record_verification(result.is_approved, start.elapsed().as_millis() as u64);
            Ok(Json(result.as_ref().clone()))
        }
        Err(error) => Err(verify_error_response(&error)),
    }
}

/// Health check endpoint.
async fn health_handler<B: GenerativeBackend + 'static>(
    State(state): State<Arc<GatewayState<B>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_entries: state.verifier.cache_entries(),
    })
}

/// Create the Axum router for the verification gateway.
pub fn create_gateway_router<B: GenerativeBackend + 'static>(state: GatewayState<B>) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/verify", post(verify_handler::<B>))
        .route("/api/health", get(health_handler::<B>))
        .with_state(state)
}
