//! Cache fingerprints for verification requests.
//!
//! The fingerprint is the sole cache identity: identical input pair implies
//! identical fingerprint, and no collision handling exists beyond digest
//! collision probability.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::VerificationRequest;

/// Deterministic digest identifying a cache entry from request content.
///
/// SHA-256 over `"{client_description}:{freelancer_submission}"`, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest the two input texts joined by a colon.
    pub fn compute(client_description: &str, freelancer_submission: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(client_description.as_bytes());
        hasher.update(b":");
        hasher.update(freelancer_submission.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint of a full request.
    pub fn of(request: &VerificationRequest) -> Self {
        Self::compute(&request.client_description, &request.freelancer_submission)
    }

    /// Hex digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_inputs_identical_fingerprint() {
        let a = Fingerprint::compute("Build a login page", "Here is the login page code...");
        let b = Fingerprint::compute("Build a login page", "Here is the login page code...");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs_different_fingerprint() {
        let a = Fingerprint::compute("task a", "work");
        let b = Fingerprint::compute("task b", "work");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = Fingerprint::compute("x", "y");
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    proptest! {
        #[test]
        fn prop_fingerprint_deterministic(desc in ".*", work in ".*") {
            let a = Fingerprint::compute(&desc, &work);
            let b = Fingerprint::compute(&desc, &work);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_fingerprint_matches_request(desc in ".{1,64}", work in ".{1,64}") {
            let request = VerificationRequest::new(desc.clone(), work.clone());
            prop_assert_eq!(Fingerprint::of(&request), Fingerprint::compute(&desc, &work));
        }
    }
}
