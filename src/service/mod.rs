//! Verification Gateway REST service.
//!
//! Exposes the verification pipeline over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /verify` - Verify a (client requirement, submission) pair
//! - `GET /api/health` - Service health check
//!
//! Status mapping: `200` with a well-formed `VerificationResult` (including
//! degraded negative results), `400 {error}` for missing fields, `429 {error}`
//! when admission control rejects, `500 {error}` on unhandled failure.

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_escrow_operation, record_verification};
pub use routes::{create_gateway_router, ErrorBody, HealthResponse};
pub use state::{verifier_config_from_env, GatewayState};

#[cfg(feature = "http-backend")]
pub use routes::AppState;
