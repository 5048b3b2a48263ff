//! Escrow contract clients.
//!
//! The relay never constructs or signs transactions itself; the
//! [`ContractClient`] boundary is "submit a signed transaction, await a
//! receipt, return its hash". The mock implementation keeps escrow state in
//! memory; the HTTP implementation forwards to a signer sidecar.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use super::{EscrowDetails, TxHash};

/// Failure modes of a contract call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContractError {
    /// The call exceeded its deadline.
    #[error("escrow call timed out")]
    Timeout,
    /// Connection-level failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Non-success HTTP status from the signer.
    #[error("signer returned status {0}")]
    Status(u16),
    /// Response arrived but did not match the expected shape.
    #[error("malformed signer response")]
    MalformedResponse,
    /// No escrow exists for the given owner.
    #[error("no escrow found for {0}")]
    NotFound(String),
    /// The client cannot be constructed from its configuration.
    #[error("contract client misconfigured: {0}")]
    Config(String),
}

/// A deployed escrow contract, seen through its relay operations.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Lock funds for a beneficiary until `release_time`.
    async fn deposit(&self, beneficiary: &str, release_time: i64, amount: f64) -> Result<TxHash, ContractError>;

    /// Release the owner's escrowed funds to the beneficiary.
    async fn release(&self, owner: &str) -> Result<TxHash, ContractError>;

    /// Current escrow state for an owner.
    async fn details(&self, owner: &str) -> Result<EscrowDetails, ContractError>;
}

/// In-memory contract client for testing and development.
///
/// Deposits are keyed by the configured sender address, mirroring a relay
/// that signs every transaction with one backend account.
#[derive(Debug)]
pub struct MockContractClient {
    sender: String,
    escrows: Mutex<HashMap<String, EscrowDetails>>,
    nonce: AtomicU64,
}

impl MockContractClient {
    /// Create a mock client signing as `sender`.
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            escrows: Mutex::new(HashMap::new()),
            nonce: AtomicU64::new(0),
        }
    }

    /// The address deposits are recorded under.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    fn next_hash(&self, payload: &str) -> TxHash {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(nonce.to_be_bytes());
        hasher.update(payload.as_bytes());
        TxHash::new(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

impl Default for MockContractClient {
    fn default() -> Self {
        Self::new("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    }
}

#[async_trait]
impl ContractClient for MockContractClient {
    async fn deposit(&self, beneficiary: &str, release_time: i64, amount: f64) -> Result<TxHash, ContractError> {
        let details = EscrowDetails {
            beneficiary: beneficiary.to_string(),
            release_time,
            amount,
            released: false,
        };
        self.escrows.lock().insert(self.sender.clone(), details);
        Ok(self.next_hash(&format!("deposit:{beneficiary}:{release_time}")))
    }

    async fn release(&self, owner: &str) -> Result<TxHash, ContractError> {
        let mut escrows = self.escrows.lock();
        let details = escrows
            .get_mut(owner)
            .ok_or_else(|| ContractError::NotFound(owner.to_string()))?;
        details.released = true;
        Ok(self.next_hash(&format!("release:{owner}")))
    }

    async fn details(&self, owner: &str) -> Result<EscrowDetails, ContractError> {
        self.escrows
            .lock()
            .get(owner)
            .cloned()
            .ok_or_else(|| ContractError::NotFound(owner.to_string()))
    }
}

#[cfg(feature = "http-backend")]
pub use http::HttpContractClient;

#[cfg(feature = "http-backend")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::escrow::{EscrowDetails, TxHash};

    use super::{ContractClient, ContractError};

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Contract client that forwards calls to a signer sidecar as JSON.
    pub struct HttpContractClient {
        client: reqwest::Client,
        base_url: String,
    }

    impl HttpContractClient {
        /// Create a client for the given signer base URL.
        pub fn new(base_url: impl Into<String>) -> Result<Self, ContractError> {
            let client = reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| ContractError::Config(e.to_string()))?;
            Ok(Self {
                client,
                base_url: base_url.into(),
            })
        }

        /// Build from `ESCROW_SIGNER_URL`, defaulting to the local node.
        pub fn from_env() -> Result<Self, ContractError> {
            let base_url = std::env::var("ESCROW_SIGNER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());
            Self::new(base_url)
        }

        async fn post(&self, path: &str, body: Value) -> Result<Value, ContractError> {
            let response = self
                .client
                .post(format!("{}{path}", self.base_url))
                .json(&body)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(ContractError::Status(status.as_u16()));
            }

            response.json().await.map_err(map_reqwest_error)
        }

        fn tx_hash(payload: &Value) -> Result<TxHash, ContractError> {
            payload
                .get("txHash")
                .and_then(Value::as_str)
                .map(TxHash::new)
                .ok_or(ContractError::MalformedResponse)
        }
    }

    fn map_reqwest_error(error: reqwest::Error) -> ContractError {
        if error.is_timeout() {
            ContractError::Timeout
        } else {
            ContractError::Transport(error.to_string())
        }
    }

    #[async_trait]
    impl ContractClient for HttpContractClient {
        async fn deposit(&self, beneficiary: &str, release_time: i64, amount: f64) -> Result<TxHash, ContractError> {
            let payload = self
                .post(
                    "/deposit",
                    json!({
                        "beneficiary": beneficiary,
                        "releaseTime": release_time,
                        "amount": amount,
                    }),
                )
                .await?;
            Self::tx_hash(&payload)
        }

        async fn release(&self, owner: &str) -> Result<TxHash, ContractError> {
            let payload = self.post("/release", json!({ "owner": owner })).await?;
            Self::tx_hash(&payload)
        }

        async fn details(&self, owner: &str) -> Result<EscrowDetails, ContractError> {
            let response = self
                .client
                .get(format!("{}/details/{owner}", self.base_url))
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if status.as_u16() == 404 {
                return Err(ContractError::NotFound(owner.to_string()));
            }
            if !status.is_success() {
                return Err(ContractError::Status(status.as_u16()));
            }

            response
                .json::<EscrowDetails>()
                .await
                .map_err(|_| ContractError::MalformedResponse)
        }
    }
}
