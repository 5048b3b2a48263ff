//! Wire types for the verification gateway.

pub mod request;
pub mod result;

pub use request::{ValidationError, VerificationRequest};
pub use result::{RequirementCheck, VerificationResult, MAX_EXPLANATION_CHARS};
