//! Gateway service state.

use std::sync::Arc;

use crate::admission::AdmissionConfig;
use crate::backend::GenerativeBackend;
use crate::cache::CacheConfig;
use crate::verifier::{TaskVerifier, VerifierConfig};

/// Shared state for the verification gateway, generic over the backend so
/// tests can drive the full router with a scripted backend.
pub struct GatewayState<B: GenerativeBackend + 'static> {
    /// The verification pipeline.
    pub verifier: Arc<TaskVerifier<B>>,
}

impl<B: GenerativeBackend + 'static> GatewayState<B> {
    /// Create state around an existing verifier.
    pub fn new(verifier: TaskVerifier<B>) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// Create state from a backend plus pipeline configuration.
    pub fn with_backend(backend: Arc<B>, config: VerifierConfig) -> Self {
        Self::new(TaskVerifier::new(backend, config))
    }
}

impl<B: GenerativeBackend + 'static> Clone for GatewayState<B> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
        }
    }
}

/// Read pipeline configuration from the environment.
///
/// `RATE_LIMIT_PER_MINUTE` (default 60), `CACHE_CAPACITY` (default 100),
/// `CACHE_TTL_SECS` (default 3600). Unparseable values fall back to defaults.
pub fn verifier_config_from_env() -> VerifierConfig {
    let mut admission = AdmissionConfig::default();
    if let Some(limit) = env_parse("RATE_LIMIT_PER_MINUTE") {
        admission.limit = limit;
    }

    let mut cache = CacheConfig::default();
    if let Some(capacity) = env_parse("CACHE_CAPACITY") {
        cache.capacity = capacity;
    }
    if let Some(secs) = env_parse::<u64>("CACHE_TTL_SECS") {
        cache.ttl = std::time::Duration::from_secs(secs);
    }

    VerifierConfig { admission, cache }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(feature = "http-backend")]
impl GatewayState<crate::backend::HttpGenerativeBackend> {
    /// Create state from environment variables: the Gemini backend settings
    /// plus pipeline configuration via [`verifier_config_from_env`].
    pub fn from_env() -> Result<Self, crate::backend::BackendError> {
        let backend = Arc::new(crate::backend::HttpGenerativeBackend::from_env()?);
        Ok(Self::with_backend(backend, verifier_config_from_env()))
    }
}
