//! Tests for POST /activate.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::common::*;

fn activate_body(license_key: &str, device_id: &str, kind: &str) -> Value {
    json!({
        "license_key": license_key,
        "device_id": device_id,
        "application_kind": kind,
        "device_name": "Lobby screen",
        "os_info": "Linux 6.1",
    })
}

#[tokio::test]
async fn test_activate_returns_credential() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Pro, 1, 3);

    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/activate",
            Some(activate_body(&license.license_key, "player-lobby-01", "player")),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", json);
    assert!(json["token"].as_str().unwrap().split('.').count() == 3);
    assert_eq!(json["renewed"], false);
    assert_eq!(json["device"]["device_identifier"], "player-lobby-01");
    assert_eq!(json["device"]["name"], "Lobby screen");
    assert_eq!(json["device"]["status"], "active");
    assert_eq!(json["license"]["plan"], "pro");
    assert!(json["license"].get("license_key").is_none(), "key is never echoed");
    assert!(json["expires_at"].as_i64().unwrap() > now());
}

#[tokio::test]
async fn test_activate_twice_renews() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);
    let body = activate_body(&license.license_key, "editor-desk-0001", "editor");

    let (_, first) = send(
        env.app(),
        json_request("POST", "/activate", Some(body.clone()), None),
    )
    .await;
    let (status, second) = send(
        env.app(),
        json_request("POST", "/activate", Some(body), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["renewed"], true);
    assert_eq!(first["device"]["id"], second["device"]["id"]);
}

#[tokio::test]
async fn test_activate_seat_limit() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);

    send(
        env.app(),
        json_request(
            "POST",
            "/activate",
            Some(activate_body(&license.license_key, "editor-desk-0001", "editor")),
            None,
        ),
    )
    .await;
    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/activate",
            Some(activate_body(&license.license_key, "editor-desk-0002", "editor")),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "seat_limit_exceeded");
    assert!(json["details"].as_str().unwrap().contains("1/1"));
}

#[tokio::test]
async fn test_activate_unknown_license() {
    let env = TestEnv::new();
    let (status, json) = send(
        env.app(),
        json_request(
            "POST",
            "/activate",
            Some(activate_body("ABCDE-FGHJK-MNPQR-STUVW", "editor-desk-0001", "editor")),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "license_not_found");
}

#[tokio::test]
async fn test_activate_suspended_license() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);
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
            "/activate",
            Some(activate_body(&license.license_key, "editor-desk-0001", "editor")),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "license_not_active");
}

#[tokio::test]
async fn test_activate_rejects_malformed_input() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);

    let cases = [
        activate_body("12345", "editor-desk-0001", "editor"),
        activate_body(&license.license_key, "short", "editor"),
        activate_body(&license.license_key, "editor-desk-0001", "kiosk"),
        json!({ "license_key": license.license_key }),
    ];

    for body in cases {
        let (status, json) = send(
            env.app(),
            json_request("POST", "/activate", Some(body.clone()), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json["code"], "invalid_input");
    }
}

#[tokio::test]
async fn test_activate_records_request_metadata() {
    let env = TestEnv::new();
    let license = setup_license(&env, Plan::Basic, 1, 1);

    let mut request = json_request(
        "POST",
        "/activate",
        Some(activate_body(&license.license_key, "editor-desk-0001", "editor")),
        None,
    );
    request
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.4, 10.0.0.1".parse().unwrap());
    let (status, _) = send(env.app(), request).await;
    assert_eq!(status, StatusCode::OK);

    let events = env.audit_events(AuditAction::DeviceActivate);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].ip_address.as_deref(), Some("198.51.100.4"));
    assert_eq!(events[0].user_agent.as_deref(), Some("seatcheck-tests/1.0"));
}

#[tokio::test]
async fn test_activate_timeout_leaves_no_partial_seat() {
    let env = TestEnv::with_config(&[("REQUEST_TIMEOUT", "1s")]);
    let license = setup_license(&env, Plan::Basic, 1, 1);
    let body = activate_body(&license.license_key, "editor-desk-0001", "editor");

    // Another writer holds SQLite's write lock past the request deadline
    let holder = env.conn();
    holder.execute_batch("BEGIN IMMEDIATE").unwrap();

    let (status, json) = send(
        env.app(),
        json_request("POST", "/activate", Some(body.clone()), None),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "unavailable");

    holder.execute_batch("COMMIT").unwrap();
    drop(holder);

    // The abandoned transaction either committed whole or not at all
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    let conn = env.conn();
    let seats = queries::count_active_seats(&conn, &license.id, ApplicationKind::Editor).unwrap();
    assert!(seats == 0 || seats == 1, "seats in use: {}", seats);
    if let Some(device) =
        queries::get_active_device(&conn, &license.id, "editor-desk-0001", ApplicationKind::Editor)
            .unwrap()
    {
        assert_eq!(queries::list_credentials_for_device(&conn, &device.id).unwrap().len(), 1);
    } else {
        assert_eq!(seats, 0);
    }

    let (status, retry) = send(
        env.app(),
        json_request("POST", "/activate", Some(body), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retry["renewed"], seats == 1);
    assert_eq!(
        queries::count_active_seats(&conn, &license.id, ApplicationKind::Editor).unwrap(),
        1,
        "retry never consumes a second seat"
    );
}
