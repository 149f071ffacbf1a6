//! Tests for GET /health and GET /public-key.

use axum::http::StatusCode;

use crate::common::*;

#[tokio::test]
async fn test_health() {
    let env = TestEnv::new();
    let (status, json) = send(env.app(), json_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_public_key_matches_configured_key() {
    let env = TestEnv::new();
    let (status, json) = send(env.app(), json_request("GET", "/public-key", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["alg"], "EdDSA");
    assert_eq!(json["public_key"], env.config.signing_key.public_key_b64());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let env = TestEnv::new();
    let (status, _) = send(env.app(), json_request("GET", "/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
