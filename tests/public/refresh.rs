//! Tests for POST /refresh.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

const DEVICE: &str = "player-lobby-0001";

fn activated(env: &TestEnv) -> (License, ActivationResult) {
    let license = setup_license(env, Plan::Basic, 1, 1);
    let activation = env
        .activate(&license.license_key, DEVICE, ApplicationKind::Player)
        .unwrap();
    (license, activation)
}

#[tokio::test]
async fn test_refresh_issues_new_credential() {
    let env = TestEnv::new();
    let (_, activation) = activated(&env);

    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/refresh",
            Some(json!({ "device_id": DEVICE })),
            Some(&activation.token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    let token = json["token"].as_str().unwrap();
    assert_ne!(token, activation.token);
    assert!(env.is_valid(token));
    assert!(!env.is_valid(&activation.token));
}

#[tokio::test]
async fn test_refresh_without_token() {
    let env = TestEnv::new();

    let (status, json) = send(
        env.app(),
        json_request("POST", "/refresh", Some(json!({ "device_id": DEVICE })), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "unauthorized");
}

#[tokio::test]
async fn test_refresh_with_bad_token_is_uniform() {
    let env = TestEnv::new();
    let (_, activation) = activated(&env);

    // Wrong identifier and a garbage token look the same to the caller
    for (device, token) in [("player-other-0002", activation.token.as_str()), (DEVICE, "garbage")] {
        let (status, json) = send(
            env.app(),
            json_request("POST", "/refresh", Some(json!({ "device_id": device })), Some(token)),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "invalid_credential");
        assert!(json.get("details").is_none());
    }
}

#[tokio::test]
async fn test_refresh_after_license_suspended() {
    let env = TestEnv::new();
    let (license, activation) = activated(&env);
    queries::update_license(
        &env.conn(),
        &license.id,
        &UpdateLicense {
            status: Some(LicenseStatus::Suspended),
            ..Default::default()
        },
    )
    .unwrap();

    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/refresh",
            Some(json!({ "device_id": DEVICE })),
            Some(&activation.token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "license_not_active");
    assert!(env.is_valid(&activation.token), "a refused refresh leaves the old credential alone");
}
