//! Tests for the audit log query endpoints.

use axum::http::StatusCode;

use crate::common::*;

const DEVICE: &str = "editor-desk-0001";

fn with_history(env: &TestEnv) -> License {
    let license = setup_license(env, Plan::Basic, 1, 1);
    let activation = env
        .activate(&license.license_key, DEVICE, ApplicationKind::Editor)
        .unwrap();
    let mut conn = env.conn();
    env.lifecycle()
        .refresh(&mut conn, DEVICE, &activation.token, &RequestMeta::default())
        .unwrap();
    license
}

#[tokio::test]
async fn test_query_audit_logs() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    let license = with_history(&env);

    let uri = format!("/operators/audit-logs?license_id={}", license.id);
    let (status, json) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["items"][0]["action"], "device_refresh");
    assert_eq!(json["items"][1]["action"], "device_activate");
    assert!(json["items"][1]["formatted"].as_str().unwrap().contains("activated device"));

    let (_, json) = send(
        env.app(),
        json_request("GET", "/operators/audit-logs?action=device_activate", None, Some(&token)),
    )
    .await;
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn test_audit_log_limit_is_clamped() {
    let env = TestEnv::with_config(&[
        ("AUDIT_QUERY_DEFAULT_LIMIT", "1"),
        ("AUDIT_QUERY_MAX_LIMIT", "1"),
    ]);
    let (_, token) = operator_token(&env, OperatorRole::View);
    with_history(&env);

    let (status, json) = send(
        env.app(),
        json_request("GET", "/operators/audit-logs?limit=1000", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["limit"], 1);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_audit_logs_as_text() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    with_history(&env);

    let (status, text) = send_text(
        env.app(),
        json_request(
            "GET",
            "/operators/audit-logs/text?action=device_activate",
            None,
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("[Device]"));
    assert!(text.contains(DEVICE));
}

#[tokio::test]
async fn test_audit_summary() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);
    with_history(&env);

    let (status, json) = send(
        env.app(),
        json_request("GET", "/operators/audit-logs/summary?since=1h", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["counts"]["device_activate"], 1);
    assert_eq!(json["counts"]["device_refresh"], 1);
    assert_eq!(json["counts"]["operator_login"], 1);

    let (status, _) = send(
        env.app(),
        json_request("GET", "/operators/audit-logs/summary?since=soon", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_audit_summary_rejects_windows_beyond_the_clock() {
    let env = TestEnv::new();
    let (_, token) = operator_token(&env, OperatorRole::View);

    for since in ["9223372036854775808", "18446744073709551615", "15250284452472w"] {
        let uri = format!("/operators/audit-logs/summary?since={}", since);
        let (status, json) = send(env.app(), json_request("GET", &uri, None, Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "since={}", since);
        assert_eq!(json["code"], "invalid_input");
    }

    // A large but representable window still answers
    let (status, _) = send(
        env.app(),
        json_request("GET", "/operators/audit-logs/summary?since=520w", None, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
