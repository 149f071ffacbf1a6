use std::collections::BTreeMap;

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::parse_duration;
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::models::{AuditEventQuery, AuditEventResponse};
use crate::pagination::Paginated;

const DEFAULT_SUMMARY_WINDOW: &str = "24h";

pub async fn query_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditEventQuery>,
) -> Result<Json<Paginated<AuditEventResponse>>> {
    let (default_limit, max_limit) = (state.audit_default_limit, state.audit_max_limit);
    let (limit, offset) = (query.limit(default_limit, max_limit), query.offset());

    let (events, total) = state
        .with_audit(move |audit| audit.query(&query, default_limit, max_limit))
        .await?;

    let items = events.into_iter().map(AuditEventResponse::from).collect();
    Ok(Json(Paginated::new(items, total, limit, offset)))
}

/// Same filters as `query_audit_logs`, one human-readable line per event.
pub async fn query_audit_logs_text(
    State(state): State<AppState>,
    Query(query): Query<AuditEventQuery>,
) -> Result<String> {
    let (default_limit, max_limit) = (state.audit_default_limit, state.audit_max_limit);

    let (events, _) = state
        .with_audit(move |audit| audit.query(&query, default_limit, max_limit))
        .await?;

    let lines: Vec<String> = events.iter().map(|e| e.formatted()).collect();
    Ok(lines.join("\n"))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Window such as `30m`, `24h`, `7d`
    pub since: Option<String>,
}

#[derive(Serialize)]
pub struct AuditSummary {
    pub since: i64,
    pub counts: BTreeMap<String, i64>,
}

/// Per-action event counts over a recent window.
pub async fn audit_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<AuditSummary>> {
    let window = query.since.as_deref().unwrap_or(DEFAULT_SUMMARY_WINDOW);
    let since = parse_duration(window)
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| Utc::now().timestamp().checked_sub(secs))
        .ok_or_else(|| AppError::BadRequest(format!("Invalid window: {}", window)))?;

    let counts = state
        .with_audit(move |audit| audit.aggregate_by_action(since))
        .await?;

    Ok(Json(AuditSummary { since, counts }))
}
