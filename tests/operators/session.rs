//! Tests for operator sessions and role enforcement.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_open_session_with_api_key() {
    let env = TestEnv::new();
    let (operator, api_key) =
        create_test_operator(&env.conn(), "owner@example.com", OperatorRole::Owner);

    let (status, json) = send(
        env.app(),
        json_request("POST", "/operators/session", Some(json!({ "api_key": api_key })), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["operator"]["id"], operator.id.as_str());
    assert!(json["operator"].get("api_key_hash").is_none());

    let token = json["token"].as_str().unwrap();
    let (status, _) = send(
        env.app(),
        json_request("GET", "/operators/licenses", None, Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_open_session_with_bad_key() {
    let env = TestEnv::new();

    let (status, json) = send(
        env.app(),
        json_request("POST", "/operators/session", Some(json!({ "api_key": "sc_key_nope" })), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "unauthorized");
}

#[tokio::test]
async fn test_close_session_revokes_token() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);

    let (status, json) = send(
        env.app(),
        json_request("DELETE", "/operators/session", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, json) = send(
        env.app(),
        json_request("GET", "/operators/licenses", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "invalid_credential");
}

#[tokio::test]
async fn test_operator_routes_require_a_token() {
    let env = TestEnv::new();

    for (method, uri) in [
        ("GET", "/operators/licenses"),
        ("POST", "/operators/licenses"),
        ("GET", "/operators"),
        ("GET", "/operators/audit-logs"),
    ] {
        let (status, _) = send(env.app(), json_request(method, uri, Some(json!({})), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn test_device_credential_cannot_act_as_operator() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);
    let activation = env
        .activate(&license.license_key, "editor-desk-0001", ApplicationKind::Editor)
        .unwrap();

    let (status, json) = send(
        env.app(),
        json_request("GET", "/operators/licenses", None, Some(&activation.token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "invalid_credential");
}

#[tokio::test]
async fn test_view_role_is_read_only() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    let org = create_test_org(&env.conn(), "Acme");

    let (status, _) = send(
        env.app(),
        json_request("GET", "/operators/organizations", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/operators/licenses",
            Some(json!({
                "organization_id": org.id,
                "plan": "basic",
                "seats_editor": 1,
                "seats_player": 1,
                "valid_until": future_timestamp(30),
            })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "forbidden");
}

#[tokio::test]
async fn test_only_owner_manages_operators() {
    let env = TestEnv::new();
    let (_, admin) = operator_token(&env, OperatorRole::Admin);
    let (_, owner) = operator_token(&env, OperatorRole::Owner);
    let body = json!({ "email": "New.Ops@Example.com", "name": "New Ops", "role": "view" });

    let (status, _) = send(
        env.app(),
        json_request("POST", "/operators", Some(body.clone()), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        env.app(),
        json_request("POST", "/operators", Some(body.clone()), Some(&owner)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["operator"]["email"], "new.ops@example.com");
    assert!(json["api_key"].as_str().unwrap().starts_with("sc_key_"));

    let (status, json) = send(
        env.app(),
        json_request("POST", "/operators", Some(body), Some(&owner)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "conflict");

    let (status, json) = send(
        env.app(),
        json_request("GET", "/operators", None, Some(&owner)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
}
