//! Tests for POST /validate.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

fn activated(env: &TestEnv) -> ActivationResult {
    let license = setup_license(env, Plan::Pro, 2, 2);
    env.activate(&license.license_key, "editor-desk-0001", ApplicationKind::Editor)
        .unwrap()
}

#[tokio::test]
async fn test_validate_token_in_body() {
    let env = TestEnv::new();
    let activation = activated(&env);

    let (status, json) = send(
        env.app(),
        json_request("POST", "/validate", Some(json!({ "token": activation.token })), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);
    assert_eq!(json["claims"]["subject"], activation.device.id.as_str());
    assert_eq!(json["claims"]["plan"], "pro");
    assert_eq!(json["claims"]["application_kind"], "editor");
    let features: Vec<&str> = json["claims"]["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert!(features.contains(&"premium_templates"));
}

#[tokio::test]
async fn test_validate_bearer_token() {
    let env = TestEnv::new();
    let activation = activated(&env);

    let (status, json) = send(
        env.app(),
        json_request("POST", "/validate", None, Some(&activation.token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);
}

#[tokio::test]
async fn test_validate_garbage_is_invalid_not_error() {
    let env = TestEnv::new();

    let (status, json) = send(
        env.app(),
        json_request("POST", "/validate", Some(json!({ "token": "not.a.token" })), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], false);
    assert!(json.get("claims").is_none());
}

#[tokio::test]
async fn test_validate_requires_a_token() {
    let env = TestEnv::new();

    let (status, json) = send(env.app(), json_request("POST", "/validate", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_input");
}

#[tokio::test]
async fn test_validate_revoked_token() {
    let env = TestEnv::new();
    let activation = activated(&env);
    queries::revoke_all_for_device(&env.conn(), &activation.device.id, now()).unwrap();

    let (status, json) = send(
        env.app(),
        json_request("POST", "/validate", Some(json!({ "token": activation.token })), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], false);
}
