use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::Config;
use crate::fixtures;
use crate::gateway::payload::{ChatRequest, ChatResponse};
use crate::gateway::{GatewayError, GatewayState, cors_layer, create_router_with_state};
use crate::pipeline::{BundleHandle, ModelBundle};
use crate::scoring::{MockScorer, Reranker};

fn bundle_keyed_on(token: &str) -> ModelBundle<MockScorer> {
    ModelBundle::from_parts(
        fixtures::sample_catalog(),
        fixtures::sample_retriever(),
        Reranker::new(
            MockScorer::keyed_on(fixtures::rerank_id(token)),
            fixtures::rerank_vocab(),
        )
        .unwrap(),
    )
    .unwrap()
}

fn test_router() -> (Router, Arc<BundleHandle<MockScorer>>) {
    let handle = Arc::new(BundleHandle::new(bundle_keyed_on("tampa")));
    let router = create_router_with_state(
        GatewayState::new(Arc::clone(&handle)),
        cors_layer(&Config::default()),
    );
    (router, handle)
}

async fn send_json(router: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn chat(router: &Router, body: serde_json::Value) -> ChatResponse {
    let (status, bytes) = send_json(router, "/chat", body).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

async fn assert_rejected(body: serde_json::Value) {
    let (router, _) = test_router();
    let (status, bytes) = send_json(&router, "/chat", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], 422);
    assert!(error["error"].as_str().unwrap().contains("invalid request"));
}

mod validation {
    use super::*;

    fn request(message: &str, top_k: usize, top_n: usize) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            top_k,
            top_n,
        }
    }

    #[test]
    fn test_defaults_applied() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "3 bed in AZ"}"#).unwrap();
        assert_eq!(req.top_k, 5);
        assert_eq!(req.top_n, 50);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_bounds_inclusive() {
        assert!(request("x", 1, 10).validate().is_ok());
        assert!(request(&"x".repeat(2000), 20, 500).validate().is_ok());
    }

    #[test]
    fn test_out_of_range() {
        assert!(request("", 5, 50).validate().is_err());
        assert!(request(&"x".repeat(2001), 5, 50).validate().is_err());
        assert!(request("x", 0, 50).validate().is_err());
        assert!(request("x", 21, 50).validate().is_err());
        assert!(request("x", 5, 9).validate().is_err());
        assert!(request("x", 5, 501).validate().is_err());
    }

    #[test]
    fn test_message_length_counts_chars() {
        let message = "é".repeat(2000);
        assert_eq!(message.len(), 4000);
        assert!(request(&message, 5, 50).validate().is_ok());
    }

    #[test]
    fn test_error_names_field() {
        let err = request("x", 5, 501).validate().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
        assert!(err.to_string().contains("top_n"));
    }
}

#[tokio::test]
async fn test_health() {
    let (router, _) = test_router();
    let (status, body) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn test_version() {
    let (router, _) = test_router();
    let (status, body) = get_json(&router, "/version").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_version"], "1.0");
    assert_eq!(body["dual_vocab_size"], 10);
    assert_eq!(body["cross_vocab_size"], 11);
    assert_eq!(body["num_deals"], 3);
    assert_eq!(
        body["checkpoints"]["cross_encoder"],
        "cross_encoder_best.safetensors"
    );
    assert!(body["fingerprints"]["dual_encoder"].is_null());
    assert!(
        chrono::DateTime::parse_from_rfc3339(body["loaded_at"].as_str().unwrap()).is_ok()
    );
}

#[tokio::test]
async fn test_chat_ranked() {
    let (router, _) = test_router();
    let response = chat(
        &router,
        serde_json::json!({"message": "3 bed in AZ under 350k", "top_k": 2}),
    )
    .await;

    assert!(!response.needs_clarification);
    assert!(response.missing_fields.is_none());
    assert_eq!(
        response.reply,
        "Here are the top deals I found based on your message."
    );
    assert_eq!(response.deals.len(), 2);
    assert_eq!(response.deals[0].city, "Tampa");
    assert_eq!(response.deals[0].rerank_score, 3.0);
    assert_eq!(response.deals[1].city, "Phoenix");
    assert_eq!(response.deals[1].property_id, 1);
    assert!((response.deals[1].retrieval_sim - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_chat_clarification() {
    let (router, _) = test_router();
    let response = chat(&router, serde_json::json!({"message": "nice house"})).await;

    assert!(response.needs_clarification);
    assert!(response.deals.is_empty());
    assert_eq!(
        response.missing_fields,
        Some(vec![
            "location (city/state)".to_string(),
            "bedrooms (e.g., 3 bed)".to_string(),
            "max purchase price (e.g., under 350k)".to_string(),
        ])
    );
    assert!(response.reply.starts_with("To find the best deals"));
}

#[tokio::test]
async fn test_chat_rejects_invalid_requests() {
    assert_rejected(serde_json::json!({"message": ""})).await;
    assert_rejected(serde_json::json!({"message": "x".repeat(2001)})).await;
    assert_rejected(serde_json::json!({"message": "3 bed in AZ", "top_k": 0})).await;
    assert_rejected(serde_json::json!({"message": "3 bed in AZ", "top_k": 21})).await;
    assert_rejected(serde_json::json!({"message": "3 bed in AZ", "top_n": 9})).await;
    assert_rejected(serde_json::json!({"message": "3 bed in AZ", "top_n": 501})).await;
    assert_rejected(serde_json::json!({"message": "3 bed in AZ", "top_k": -1})).await;
    assert_rejected(serde_json::json!({"top_k": 5})).await;
    assert_rejected(serde_json::json!({"message": 42})).await;
}

#[tokio::test]
async fn test_swap_changes_served_bundle() {
    let (router, handle) = test_router();
    let body = serde_json::json!({"message": "3 bed in AZ under 350k", "top_k": 1});

    assert_eq!(chat(&router, body.clone()).await.deals[0].city, "Tampa");
    handle.swap(bundle_keyed_on("dallas"));
    assert_eq!(chat(&router, body).await.deals[0].city, "Dallas");
}

#[tokio::test]
async fn test_cors_any_origin() {
    let (router, _) = test_router();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_origin_list() {
    let handle = Arc::new(BundleHandle::new(bundle_keyed_on("tampa")));
    let config = Config {
        cors_origins: vec!["https://app.example.com".to_string()],
        ..Default::default()
    };
    let router = create_router_with_state(GatewayState::new(handle), cors_layer(&config));

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
