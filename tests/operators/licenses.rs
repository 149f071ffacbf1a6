//! Tests for organization and license administration.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

#[tokio::test]
async fn test_create_org_and_license() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);

    let (status, org) = send(
        env.app(),
        json_request(
            "POST",
            "/operators/organizations",
            Some(json!({ "name": "  Acme Signage " })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(org["name"], "Acme Signage");

    let (status, license) = send(
        env.app(),
        json_request(
            "POST",
            "/operators/licenses",
            Some(json!({
                "organization_id": org["id"],
                "plan": "max",
                "seats_editor": 2,
                "seats_player": 10,
                "valid_until": future_timestamp(365),
            })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", license);
    assert_eq!(license["status"], "active");
    let key = license["license_key"].as_str().unwrap();
    assert_eq!(normalize_license_key(key).as_deref(), Some(key));

    // The new key works for activation immediately
    assert!(env.activate(key, "editor-desk-0001", ApplicationKind::Editor).is_ok());

    let uri = format!("/operators/licenses/{}", license["id"].as_str().unwrap());
    let (status, usage) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(usage["editor_seats_in_use"], 1);
    assert_eq!(usage["player_seats_in_use"], 0);

    assert_eq!(env.audit_events(AuditAction::OrganizationCreate).len(), 1);
    assert_eq!(env.audit_events(AuditAction::LicenseCreate).len(), 1);
}

#[tokio::test]
async fn test_create_license_validation() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    let org = create_test_org(&env.conn(), "Acme");

    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/operators/licenses",
            Some(json!({
                "organization_id": "sc_org_missing",
                "plan": "basic",
                "seats_editor": 1,
                "seats_player": 1,
                "valid_until": future_timestamp(30),
            })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{}", json);

    for bad in [
        json!({
            "organization_id": org.id,
            "plan": "basic",
            "seats_editor": 0,
            "seats_player": 1,
            "valid_until": future_timestamp(30),
        }),
        json!({
            "organization_id": org.id,
            "plan": "basic",
            "seats_editor": 1,
            "seats_player": 1,
            "valid_until": past_timestamp(1),
        }),
        json!({
            "organization_id": org.id,
            "plan": "platinum",
            "seats_editor": 1,
            "seats_player": 1,
            "valid_until": future_timestamp(30),
        }),
    ] {
        let (status, json) = send(
            env.app(),
            json_request("POST", "/operators/licenses", Some(bad.clone()), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", bad, json);
    }
}

#[tokio::test]
async fn test_update_license_status() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    let license = setup_license(&env, Plan::Basic, 1, 1);
    let uri = format!("/operators/licenses/{}", license.id);

    let (status, json) = send(
        env.app(),
        json_request("PUT", &uri, Some(json!({ "status": "suspended" })), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "suspended");

    let err = env
        .activate(&license.license_key, "editor-desk-0001", ApplicationKind::Editor)
        .unwrap_err();
    assert!(matches!(err, AppError::LicenseNotActive(LicenseStatus::Suspended)));

    let (status, _) = send(
        env.app(),
        json_request("PUT", &uri, Some(json!({})), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        env.app(),
        json_request(
            "PUT",
            "/operators/licenses/sc_lic_missing",
            Some(json!({ "plan": "pro" })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let events = env.audit_events(AuditAction::LicenseUpdate);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].license_id.as_deref(), Some(license.id.as_str()));
}

#[tokio::test]
async fn test_lowering_capacity_keeps_existing_seats() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Admin);
    let license = setup_license(&env, Plan::Basic, 2, 1);
    let first = env
        .activate(&license.license_key, "editor-desk-0001", ApplicationKind::Editor)
        .unwrap();
    env.activate(&license.license_key, "editor-desk-0002", ApplicationKind::Editor).unwrap();

    let uri = format!("/operators/licenses/{}", license.id);
    let (status, _) = send(
        env.app(),
        json_request("PUT", &uri, Some(json!({ "seats_editor": 1 })), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert!(env.is_valid(&first.token));
    let again = env
        .activate(&license.license_key, "editor-desk-0001", ApplicationKind::Editor)
        .unwrap();
    assert!(again.renewed);
    let err = env
        .activate(&license.license_key, "editor-desk-0003", ApplicationKind::Editor)
        .unwrap_err();
    assert!(matches!(err, AppError::SeatLimitExceeded { in_use: 2, capacity: 1 }));
}

#[tokio::test]
async fn test_list_licenses_filters() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    let conn = env.conn();
    let acme = create_test_org(&conn, "Acme");
    let globex = create_test_org(&conn, "Globex");
    create_test_license(&conn, &acme, Plan::Basic, 1, 1);
    create_test_license(&conn, &acme, Plan::Pro, 1, 1);
    create_test_license(&conn, &globex, Plan::Max, 1, 1);

    let uri = format!("/operators/licenses?organization_id={}&limit=1", acme.id);
    let (status, json) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["limit"], 1);

    let (_, json) = send(
        env.app(),
        json_request("GET", "/operators/licenses", None, Some(&token)),
    )
    .await;
    assert_eq!(json["total"], 3);
}

#[tokio::test]
async fn test_update_organization() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::Owner);
    let org = create_test_org(&env.conn(), "Acme");
    let uri = format!("/operators/organizations/{}", org.id);

    let (status, json) = send(
        env.app(),
        json_request("PUT", &uri, Some(json!({ "name": "Acme Corp" })), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Acme Corp");

    let (status, json) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Acme Corp");

    let (status, _) = send(
        env.app(),
        json_request("PUT", &uri, Some(json!({ "name": "   " })), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
