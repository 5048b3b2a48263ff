//! Escrow relay: audit logging plus a thin pass-through to the deployed
//! escrow contract.
//!
//! The relay owns no escrow semantics. It appends audit rows for
//! deposit/release instructions and forwards contract calls through the
//! [`contract::ContractClient`] boundary, returning the transaction receipt
//! hash. Transaction construction and signing live behind that boundary.

pub mod contract;
pub mod store;

#[cfg(feature = "service")]
pub mod routes;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of audited escrow transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Funds locked for a beneficiary.
    Deposit,
    /// Funds released to the beneficiary.
    Release,
}

impl TransactionKind {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Release => "release",
        }
    }

    /// Parse the storage string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "release" => Some(Self::Release),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields of a new audit row; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditRecord {
    /// Escrow owner address.
    pub owner: String,
    /// Beneficiary address.
    pub beneficiary: String,
    /// Amount in ether.
    pub amount: f64,
    /// Unix timestamp after which funds may be released.
    pub release_time: i64,
}

/// One audited escrow transaction row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Row identifier.
    pub id: i64,
    /// Escrow owner address.
    pub owner_address: String,
    /// Beneficiary address.
    pub beneficiary_address: String,
    /// Amount in ether.
    pub amount: f64,
    /// Unix timestamp after which funds may be released.
    pub release_time: i64,
    /// Deposit or release.
    pub transaction_type: TransactionKind,
    /// Insertion time.
    pub timestamp: DateTime<Utc>,
}

/// Escrow state as reported by the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowDetails {
    /// Beneficiary address.
    pub beneficiary: String,
    /// Unix timestamp after which funds may be released.
    pub release_time: i64,
    /// Locked amount in ether.
    pub amount: f64,
    /// Whether the funds have been released.
    pub released: bool,
}

/// Transaction receipt hash, 0x-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    /// Wrap a receipt hash string.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// The hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub use contract::{ContractClient, ContractError, MockContractClient};
pub use store::{AuditStore, InMemoryAuditStore};

#[cfg(feature = "http-backend")]
pub use contract::HttpContractClient;

#[cfg(feature = "sqlite")]
pub use store::SqliteAuditStore;

#[cfg(feature = "service")]
pub use routes::{create_escrow_router, EscrowState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_round_trips_storage_form() {
        for kind in [TransactionKind::Deposit, TransactionKind::Release] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::parse("refund"), None);
    }

    #[test]
    fn test_new_audit_record_wire_names() {
        let json = serde_json::json!({
            "owner": "0xabc",
            "beneficiary": "0xdef",
            "amount": 1.5,
            "releaseTime": 1700000000
        });
        let record: NewAuditRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.release_time, 1_700_000_000);
    }

    #[test]
    fn test_escrow_details_wire_names() {
        let details = EscrowDetails {
            beneficiary: "0xdef".to_string(),
            release_time: 1,
            amount: 2.0,
            released: false,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("releaseTime").is_some());
        assert!(json.get("released").is_some());
    }
}
