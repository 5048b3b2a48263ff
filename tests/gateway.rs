//! End-to-end tests for the verification gateway.
//!
//! Drives the full axum router with a scripted backend and checks the
//! externally observable contract: status codes, response shapes, cache
//! behavior and admission control.

#![cfg(feature = "service")]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use taskproof::service::{create_gateway_router, GatewayState};
use taskproof::{AdmissionConfig, CacheConfig, ScriptedBackend, VerifierConfig};

const APPROVED_REPLY: &str = r#"{
    "is_approved": true,
    "explanation": "Meets the stated requirements",
    "key_points": ["complete", "clean"],
    "quality_score": 88,
    "requirements_met": [
        {"requirement": "login form", "met": true, "explanation": "present"}
    ]
}"#;

fn app(backend: Arc<ScriptedBackend>, limit: usize, capacity: usize) -> Router {
    let config = VerifierConfig {
        admission: AdmissionConfig {
            limit,
            window: Duration::from_secs(60),
        },
        cache: CacheConfig {
            capacity,
            ttl: Duration::from_secs(3600),
        },
    };
    create_gateway_router(GatewayState::with_backend(backend, config))
}

fn verify_request(description: &str, submission: &str) -> Request<Body> {
    let body = json!({
        "clientDescription": description,
        "freelancerSubmission": submission,
    });
    Request::builder()
        .method("POST")
        .uri("/verify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_valid_pair_returns_well_formed_result() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text(r#"["login form"]"#);
    backend.push_text(APPROVED_REPLY);

    let app = app(Arc::clone(&backend), 60, 100);
    let response = app
        .oneshot(verify_request("Build a login page", "Here is the login page code..."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_approved"], true);
    assert!(body["explanation"].is_string());
    assert_eq!(body["quality_score"], 88.0);
    assert_eq!(body["requirements_met"][0]["met"], true);
}

#[tokio::test]
async fn test_identical_requests_hit_cache() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("[]");
    backend.push_text(APPROVED_REPLY);

    let app = app(Arc::clone(&backend), 60, 100);

    let first = app
        .clone()
        .oneshot(verify_request("Build a login page", "Here is the login page code..."))
        .await
        .unwrap();
    let second = app
        .oneshot(verify_request("Build a login page", "Here is the login page code..."))
        .await
        .unwrap();

    let first = json_body(first).await;
    let second = json_body(second).await;

    assert_eq!(first, second, "cache hit must return a bit-identical result");
    assert_eq!(backend.calls(), 2, "second request must make no upstream call");
}

#[tokio::test]
async fn test_sixty_first_request_rejected_without_upstream_call() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("[]");
    backend.push_text(APPROVED_REPLY);

    let app = app(Arc::clone(&backend), 60, 100);

    for _ in 0..60 {
        let response = app
            .clone()
            .oneshot(verify_request("same task", "same work"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(verify_request("same task", "same work"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Rate limit exceeded"));
    // One extraction plus one judgment for the initial miss; the rejected
    // request never reached the backend.
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_missing_fields_yield_400_before_pipeline() {
    let backend = Arc::new(ScriptedBackend::new());
    let app = app(Arc::clone(&backend), 60, 100);

    for body in [
        json!({"clientDescription": "", "freelancerSubmission": "work"}),
        json!({"clientDescription": "task", "freelancerSubmission": ""}),
        json!({"freelancerSubmission": "work"}),
        json!({}),
    ] {
        let request = Request::builder()
            .method("POST")
            .uri("/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let reply = json_body(response).await;
        assert_eq!(reply["error"], "Missing required fields");
    }

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_eviction_beyond_capacity_causes_recomputation() {
    let backend = Arc::new(ScriptedBackend::new());
    // 101 distinct misses, then one recomputation of the evicted key.
    for _ in 0..102 {
        backend.push_text("[]");
        backend.push_text(APPROVED_REPLY);
    }

    let app = app(Arc::clone(&backend), 1000, 100);

    for i in 0..101 {
        let response = app
            .clone()
            .oneshot(verify_request(&format!("task {i}"), "work"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(backend.calls(), 202);

    // "task 0" was least recently used and must have been evicted.
    let response = app.oneshot(verify_request("task 0", "work")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.calls(), 204, "evicted key must be recomputed");
}

#[tokio::test]
async fn test_malformed_upstream_output_never_yields_500() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("[]");
    backend.push_text("<html>definitely not JSON</html>");

    let app = app(Arc::clone(&backend), 60, 100);
    let response = app.oneshot(verify_request("task", "work")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_approved"], false);
    assert!(!body["explanation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_embeds_cause_in_result() {
    let backend = Arc::new(ScriptedBackend::new());
    // Both the extraction and judgment calls fail (queue exhausted).

    let app = app(Arc::clone(&backend), 60, 100);
    let response = app.oneshot(verify_request("task", "work")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_approved"], false);
    assert!(body["explanation"]
        .as_str()
        .unwrap()
        .starts_with("Error during verification:"));
    assert_eq!(body["key_points"][0], "Verification failed");
    assert_eq!(body["quality_score"], 0.0);
}

#[tokio::test]
async fn test_health_endpoint_reports_cache() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_text("[]");
    backend.push_text(APPROVED_REPLY);

    let app = app(Arc::clone(&backend), 60, 100);

    app.clone()
        .oneshot(verify_request("task", "work"))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache_entries"], 1);
}
