//! Tests for device and credential administration.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

const DEVICE: &str = "player-lobby-0001";

fn activated(env: &TestEnv) -> (License, ActivationResult) {
    let license = setup_license(env, Plan::Pro, 1, 2);
    let activation = env
        .activate(&license.license_key, DEVICE, ApplicationKind::Player)
        .unwrap();
    (license, activation)
}

#[tokio::test]
async fn test_list_license_devices_and_credentials() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    let (license, activation) = activated(&env);

    let uri = format!("/operators/licenses/{}/devices?status=active", license.id);
    let (status, json) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["device_identifier"], DEVICE);

    let uri = format!("/operators/devices/{}/credentials", activation.device.id);
    let (status, json) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["revoked"], false);
    assert!(records[0].get("token").is_none());
    assert_eq!(records[0]["content_hash"].as_str().unwrap().len(), 64);

    let (status, json) = send(
        env.app(),
        json_request("GET", "/operators/devices/sc_dev_missing", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "device_not_found");
}

#[tokio::test]
async fn test_revoke_single_credential() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    let (_, activation) = activated(&env);
    let records = queries::list_credentials_for_device(&env.conn(), &activation.device.id).unwrap();

    let uri = format!("/operators/credentials/{}/revoke", records[0].credential_id);
    let (status, json) = send(env.app(), json_request("POST", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["revoked"], true);
    assert!(!env.is_valid(&activation.token));

    let (_, json) = send(env.app(), json_request("POST", &uri, None, Some(&token))).await;
    assert_eq!(json["revoked"], false);

    let events = env.audit_events(AuditAction::CredentialRevoke);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].actor_type, ActorType::Operator);
}

#[tokio::test]
async fn test_revoke_device_credentials() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    let (license, activation) = activated(&env);
    let second = env
        .activate(&license.license_key, DEVICE, ApplicationKind::Player)
        .unwrap();

    let uri = format!("/operators/devices/{}/revoke-credentials", activation.device.id);
    let (status, json) = send(env.app(), json_request("POST", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["credentials_revoked"], 2);
    assert!(!env.is_valid(&activation.token));
    assert!(!env.is_valid(&second.token));
}

#[tokio::test]
async fn test_delete_device() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    let (license, activation) = activated(&env);

    let uri = format!("/operators/devices/{}", activation.device.id);
    let (status, json) = send(env.app(), json_request("DELETE", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], activation.device.id.as_str());

    let (status, _) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        queries::count_active_seats(&env.conn(), &license.id, ApplicationKind::Player).unwrap(),
        0
    );

    let (status, _) = send(env.app(), json_request("DELETE", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_view_role_cannot_revoke() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    let (_, activation) = activated(&env);

    let uri = format!("/operators/devices/{}/revoke-credentials", activation.device.id);
    let (status, _) = send(
        env.app(),
        json_request("POST", &uri, Some(json!({})), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(env.is_valid(&activation.token));
}

#[tokio::test]
async fn test_purge_credentials() {
    let env = TestEnv::with_config(&[("CREDENTIAL_TTL", "1"), ("REFRESH_GRACE", "0")]);
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    activated(&env);

    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

    let (status, json) = send(
        env.app(),
        json_request("POST", "/operators/maintenance/purge-credentials", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Operator session credentials live longer and survive
    assert_eq!(json["purged"], 1);
    assert_eq!(env.audit_events(AuditAction::CredentialPurge).len(), 1);
}
