//! Axum routes for the escrow relay.
//!
//! ## Endpoints
//!
//! - `POST /log-deposit`, `POST /log-release` - Append an audit row
//! - `GET /history/{address}` - Audit rows for an address, newest first
//! - `POST /escrow/deposit`, `POST /escrow/release` - Forward to the contract
//! - `GET /escrow/details/{owner}` - Current escrow state
//! - `GET /api/health` - Service health check

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::service::middleware::record_escrow_operation;
use crate::service::routes::ErrorBody;

use super::contract::{ContractClient, ContractError};
use super::store::AuditStore;
use super::{AuditRecord, NewAuditRecord, TransactionKind, TxHash};

/// Shared state for the escrow relay.
pub struct EscrowState<S: AuditStore + 'static, C: ContractClient + 'static> {
    /// Audit row storage.
    pub store: Arc<S>,
    /// Client for the deployed escrow contract.
    pub contract: Arc<C>,
}

impl<S: AuditStore + 'static, C: ContractClient + 'static> EscrowState<S, C> {
    /// Create relay state from a store and contract client.
    pub fn new(store: S, contract: C) -> Self {
        Self {
            store: Arc::new(store),
            contract: Arc::new(contract),
        }
    }
}

impl<S: AuditStore + 'static, C: ContractClient + 'static> Clone for EscrowState<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            contract: Arc::clone(&self.contract),
        }
    }
}

/// Body for `/escrow/deposit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    /// Beneficiary address.
    pub beneficiary: String,
    /// Unix timestamp after which funds may be released.
    pub release_time: i64,
    /// Amount in ether.
    pub amount: f64,
}

/// Body for `/escrow/release`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRequest {
    /// Escrow owner address.
    pub owner: String,
}

/// Simple success acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBody {
    /// Always `"success"` on the happy path.
    pub status: String,
}

impl StatusBody {
    fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Acknowledgement carrying a transaction receipt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    /// Always `"success"` on the happy path.
    pub status: String,
    /// Receipt hash of the forwarded transaction.
    pub tx_hash: TxHash,
}

type ErrorReply = (StatusCode, Json<ErrorBody>);

fn store_error<E: std::error::Error>(error: E) -> ErrorReply {
    tracing::error!(error = %error, "audit store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(error.to_string())),
    )
}

fn contract_error(error: ContractError) -> ErrorReply {
    let status = match &error {
        ContractError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %error, "contract call failure");
    (status, Json(ErrorBody::new(error.to_string())))
}

async fn log_transaction<S: AuditStore, C: ContractClient>(
    state: &EscrowState<S, C>,
    kind: TransactionKind,
    record: &NewAuditRecord,
) -> Result<Json<StatusBody>, ErrorReply> {
    let start = Instant::now();
    let outcome = state.store.append(kind, record).await;
    record_escrow_operation(
        &format!("log_{kind}"),
        outcome.is_ok(),
        start.elapsed().as_millis() as u64,
    );
    outcome.map_err(store_error)?;
    Ok(Json(StatusBody::success()))
}

/// Append a deposit audit row.
async fn log_deposit_handler<S: AuditStore + 'static, C: ContractClient + 'static>(
    State(state): State<Arc<EscrowState<S, C>>>,
    Json(record): Json<NewAuditRecord>,
) -> Result<Json<StatusBody>, ErrorReply> {
    log_transaction(&state, TransactionKind::Deposit, &record).await
}

/// Append a release audit row.
async fn log_release_handler<S: AuditStore + 'static, C: ContractClient + 'static>(
    State(state): State<Arc<EscrowState<S, C>>>,
    Json(record): Json<NewAuditRecord>,
) -> Result<Json<StatusBody>, ErrorReply> {
    log_transaction(&state, TransactionKind::Release, &record).await
}

/// Audit history for an address.
async fn history_handler<S: AuditStore + 'static, C: ContractClient + 'static>(
    State(state): State<Arc<EscrowState<S, C>>>,
    Path(address): Path<String>,
) -> Result<Json<Vec<AuditRecord>>, ErrorReply> {
    let rows = state.store.history(&address).await.map_err(store_error)?;
    Ok(Json(rows))
}

/// Forward a deposit to the contract.
async fn deposit_handler<S: AuditStore + 'static, C: ContractClient + 'static>(
    State(state): State<Arc<EscrowState<S, C>>>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<TxResponse>, ErrorReply> {
    let start = Instant::now();
    let outcome = state
        .contract
        .deposit(&request.beneficiary, request.release_time, request.amount)
        .await;
    record_escrow_operation("deposit", outcome.is_ok(), start.elapsed().as_millis() as u64);

    let tx_hash = outcome.map_err(contract_error)?;
    Ok(Json(TxResponse {
        status: "success".to_string(),
        tx_hash,
    }))
}

/// Forward a release to the contract.
async fn release_handler<S: AuditStore + 'static, C: ContractClient + 'static>(
    State(state): State<Arc<EscrowState<S, C>>>,
    Json(request): Json<ReleaseRequest>,
) -> Result<Json<TxResponse>, ErrorReply> {
    let start = Instant::now();
    let outcome = state.contract.release(&request.owner).await;
    record_escrow_operation("release", outcome.is_ok(), start.elapsed().as_millis() as u64);

    let tx_hash = outcome.map_err(contract_error)?;
    Ok(Json(TxResponse {
        status: "success".to_string(),
        tx_hash,
    }))
}

/// Escrow state for an owner.
async fn details_handler<S: AuditStore + 'static, C: ContractClient + 'static>(
    State(state): State<Arc<EscrowState<S, C>>>,
    Path(owner): Path<String>,
) -> Result<Json<super::EscrowDetails>, ErrorReply> {
    let details = state.contract.details(&owner).await.map_err(contract_error)?;
    Ok(Json(details))
}

/// Health check endpoint.
async fn health_handler() -> Json<StatusBody> {
    Json(StatusBody {
        status: "healthy".to_string(),
    })
}

/// Create the Axum router for the escrow relay.
pub fn create_escrow_router<S: AuditStore + 'static, C: ContractClient + 'static>(
    state: EscrowState<S, C>,
) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/log-deposit", post(log_deposit_handler::<S, C>))
        .route("/log-release", post(log_release_handler::<S, C>))
        .route("/history/:address", get(history_handler::<S, C>))
        .route("/escrow/deposit", post(deposit_handler::<S, C>))
        .route("/escrow/release", post(release_handler::<S, C>))
        .route("/escrow/details/:owner", get(details_handler::<S, C>))
        .route("/api/health", get(health_handler))
        .with_state(state)
}
