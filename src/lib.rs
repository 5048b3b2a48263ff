//! # taskproof
//!
//! Two thin HTTP backends for freelance task delivery:
//!
//! - **Verification Gateway**: accepts a (client requirement, submission)
//!   pair, applies admission control, and returns a cached or freshly
//!   computed structured judgment from a generative-AI backend.
//! - **Escrow Relay**: logs escrow deposit/release instructions to an audit
//!   table and forwards transactions to a deployed escrow contract, returning
//!   the receipt hash.
//!
//! ## Core Contract
//!
//! The gateway's `/verify` path always returns a parseable response object:
//! failures inside the judgment pipeline are absorbed into a well-formed
//! negative result instead of propagating. Only validation (400), admission
//! rejection (429) and unhandled failures (500) surface as HTTP errors.
//!
//! ## Architecture
//!
//! ```text
//! Request → AdmissionController → ResultCache (fingerprint)
//!                                      ↓ miss
//!               RequirementExtractor → JudgmentGenerator
//!                                      ↓
//!                              GenerativeBackend (HTTP or scripted)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admission;
pub mod backend;
pub mod cache;
pub mod escrow;
pub mod extractor;
pub mod fingerprint;
pub mod judge;
pub mod prompt;
pub mod types;
pub mod verifier;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use admission::{AdmissionConfig, AdmissionController};
pub use backend::{BackendError, GenerativeBackend, SamplingParams, ScriptedBackend};
pub use cache::{CacheConfig, ResultCache};
pub use extractor::RequirementExtractor;
pub use fingerprint::Fingerprint;
pub use judge::JudgmentGenerator;
pub use types::{
    RequirementCheck, ValidationError, VerificationRequest, VerificationResult,
    MAX_EXPLANATION_CHARS,
};
pub use verifier::{TaskVerifier, VerifierConfig, VerifyError};

#[cfg(feature = "http-backend")]
pub use backend::HttpGenerativeBackend;

// Service re-exports (when the service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_gateway_router, GatewayState};

#[cfg(feature = "service")]
pub use escrow::{create_escrow_router, EscrowState};
