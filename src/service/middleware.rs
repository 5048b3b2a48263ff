//! Service middleware for metrics and request tracking.
//!
//! ## Metrics Exposed
//!
//! - request count, status and latency per normalized path
//! - verification outcomes (approved / rejected) with pipeline latency
//! - escrow relay outcomes per operation
//!
//! Emitted as structured tracing events under the `taskproof::metrics`
//! target, ready to be aggregated from logs.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Metrics middleware that records request counts and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "taskproof::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// Replaces hex account addresses (`/history/0xabc...`) with a placeholder.
fn normalize_path(path: &str) -> String {
    let address_regex = regex_lite::Regex::new(r"0x[0-9a-fA-F]{4,}").unwrap();

    address_regex.replace_all(path, ":address").to_string()
}

/// Record the outcome of one verification pipeline run.
pub fn record_verification(approved: bool, latency_ms: u64) {
    let outcome = if approved { "approved" } else { "rejected" };
    info!(
        target: "taskproof::metrics",
        metric_type = "verification",
        outcome = outcome,
        latency_ms = latency_ms,
        "verification_metric"
    );
}

/// Record an escrow relay operation.
pub fn record_escrow_operation(operation: &str, success: bool, latency_ms: u64) {
    let status = if success { "success" } else { "error" };
    info!(
        target: "taskproof::metrics",
        metric_type = "escrow",
        operation = operation,
        status = status,
        latency_ms = latency_ms,
        "escrow_metric"
    );
}
