use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::LicenseStatus;

/// Why a presented credential was rejected.
///
/// Kept distinct for logging; callers only ever see `invalid_credential`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("credential signature is invalid")]
    InvalidSignature,

    #[error("credential has expired")]
    Expired,

    #[error("credential has been revoked")]
    Revoked,

    #[error("credential is not valid for this audience")]
    WrongScope,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("License not found")]
    LicenseNotFound,

    #[error("License is {0}")]
    LicenseNotActive(LicenseStatus),

    #[error("License has expired")]
    LicenseExpired,

    #[error("Seat limit reached ({in_use}/{capacity})")]
    SeatLimitExceeded { in_use: i64, capacity: i64 },

    #[error("Device not found")]
    DeviceNotFound,

    #[error("Device has been deactivated")]
    DeviceDeactivated,

    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] CredentialError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Common error messages, shared so handlers and tests agree on wording.
pub mod msg {
    pub const ORGANIZATION_NOT_FOUND: &str = "Organization not found";
    pub const LICENSE_NOT_FOUND: &str = "License not found";
    pub const DEVICE_NOT_FOUND: &str = "Device not found";
    pub const OPERATOR_NOT_FOUND: &str = "Operator not found";
    pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions";
    pub const INVALID_LICENSE_KEY: &str =
        "License key must look like XXXXX-XXXXX-XXXXX-XXXXX";
    pub const INVALID_DEVICE_ID: &str = "device_id must be between 10 and 256 characters";
    pub const INVALID_VALIDITY_WINDOW: &str = "valid_until must be after valid_from";
    pub const INVALID_SEAT_COUNT: &str = "Seat capacities must be at least 1";
}

/// Convert `Option<T>` lookups into `NotFound` errors.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

impl AppError {
    /// Stable machine-readable code. Client UIs branch on this, so never rename one.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) | AppError::Json(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::LicenseNotFound => "license_not_found",
            AppError::LicenseNotActive(_) => "license_not_active",
            AppError::LicenseExpired => "license_expired",
            AppError::SeatLimitExceeded { .. } => "seat_limit_exceeded",
            AppError::DeviceNotFound => "device_not_found",
            AppError::DeviceDeactivated => "device_deactivated",
            AppError::InvalidCredential(_) => "invalid_credential",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Database(e) if is_busy(e) => "unavailable",
            AppError::Pool(_) | AppError::Timeout => "unavailable",
            AppError::Database(_) | AppError::Internal(_) => "internal",
        }
    }

    /// True for infrastructure failures the caller may retry.
    pub fn is_transient(&self) -> bool {
        self.code() == "unavailable"
    }
}

fn is_busy(e: &rusqlite::Error) -> bool {
    matches!(
        e.sqlite_error_code(),
        Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<StatusCode> for AppError {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized,
            StatusCode::FORBIDDEN => AppError::Forbidden("Access denied".into()),
            StatusCode::NOT_FOUND => AppError::NotFound("Resource not found".into()),
            _ => AppError::Internal(format!("Status: {}", code)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::LicenseNotFound => (StatusCode::NOT_FOUND, "License not found", None),
            AppError::LicenseNotActive(status) => (
                StatusCode::FORBIDDEN,
                "License is not active",
                Some(format!("License status is {}", status)),
            ),
            AppError::LicenseExpired => (StatusCode::FORBIDDEN, "License has expired", None),
            AppError::SeatLimitExceeded { in_use, capacity } => (
                StatusCode::CONFLICT,
                "Seat limit reached",
                Some(format!(
                    "{}/{} seats in use. Deactivate a device first.",
                    in_use, capacity
                )),
            ),
            AppError::DeviceNotFound => (StatusCode::NOT_FOUND, "Device not found", None),
            AppError::DeviceDeactivated => {
                (StatusCode::CONFLICT, "Device has been deactivated", None)
            }
            AppError::InvalidCredential(reason) => {
                tracing::debug!("Credential rejected: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    "Invalid session, re-activate this device",
                    None,
                )
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Database(e) if is_busy(e) => {
                tracing::warn!("Database busy: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable",
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable",
                    None,
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
            AppError::Timeout => {
                tracing::warn!("Request deadline exceeded");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable",
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
