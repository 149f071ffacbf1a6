//! Tests for POST /deactivate.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

const DEVICE: &str = "editor-desk-0001";

#[tokio::test]
async fn test_deactivate_frees_seat() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);
    let activation = env
        .activate(&license.license_key, DEVICE, ApplicationKind::Editor)
        .unwrap();

    let body = json!({
        "license_key": license.license_key,
        "device_id": DEVICE,
        "application_kind": "editor",
    });
    let (status, json) = send(
        env.app(),
        json_request("POST", "/deactivate", Some(body.clone()), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["deactivated"], 1);
    assert_eq!(json["credentials_revoked"], 1);
    assert!(!env.is_valid(&activation.token));
    assert_eq!(
        queries::count_active_seats(&env.conn(), &license.id, ApplicationKind::Editor).unwrap(),
        0
    );

    let (status, json) = send(
        env.app(),
        json_request("POST", "/deactivate", Some(body), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deactivated"], 0);
}

#[tokio::test]
async fn test_deactivate_unknown_device() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);

    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/deactivate",
            Some(json!({ "license_key": license.license_key, "device_id": DEVICE })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "device_not_found");
}

#[tokio::test]
async fn test_deactivate_wrong_license_key() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);
    let other = setup_license(&env, Plan::Basic, 1, 1);
    env.activate(&license.license_key, DEVICE, ApplicationKind::Editor)
        .unwrap();

    // Another customer's key cannot release this device
    let (status, _) = send(
        env.app(),
        json_request(
            "POST",
            "/deactivate",
            Some(json!({ "license_key": other.license_key, "device_id": DEVICE })),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        queries::count_active_seats(&env.conn(), &license.id, ApplicationKind::Editor).unwrap(),
        1
    );
}
