//! Seat admission: decides whether an activation may proceed.
//!
//! `admit` must run inside an IMMEDIATE transaction that also performs the
//! seat-consuming write. SQLite then serialises concurrent admissions on the
//! writer lock, so two requests can never both observe the last free seat.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{ApplicationKind, Device, License, LicenseStatus};

#[derive(Debug, Clone)]
pub enum Admission {
    /// The identifier already holds an active seat for this kind; no new seat is consumed.
    Renew(Device),
    /// A seat is free and reserved for a new device row.
    NewSeat { seats_in_use: i64, capacity: i64 },
}

#[derive(Debug, Clone)]
pub struct AdmissionDecision {
    pub license: License,
    pub outcome: Admission,
}

impl AdmissionDecision {
    pub fn is_renewal(&self) -> bool {
        matches!(self.outcome, Admission::Renew(_))
    }
}

/// Check license status, expiry and seat occupancy for an activation.
///
/// Seats are counted from active device rows at call time. With
/// `enforce_seats == false` capacity is ignored (migration/testing only).
pub fn admit(
    conn: &Connection,
    license_key: &str,
    device_identifier: &str,
    kind: ApplicationKind,
    now: i64,
    enforce_seats: bool,
) -> Result<AdmissionDecision> {
    let license = queries::get_license_by_key(conn, license_key)?.ok_or(AppError::LicenseNotFound)?;

    check_license_usable(&license, now)?;

    if let Some(device) = queries::get_active_device(conn, &license.id, device_identifier, kind)? {
        return Ok(AdmissionDecision {
            license,
            outcome: Admission::Renew(device),
        });
    }

    let seats_in_use = queries::count_active_seats(conn, &license.id, kind)?;
    let capacity = license.seat_capacity(kind);

    if enforce_seats && seats_in_use >= capacity {
        return Err(AppError::SeatLimitExceeded {
            in_use: seats_in_use,
            capacity,
        });
    }

    Ok(AdmissionDecision {
        license,
        outcome: Admission::NewSeat {
            seats_in_use,
            capacity,
        },
    })
}

/// Status and validity window are independent: an Active license past
/// `valid_until` is still rejected.
pub fn check_license_usable(license: &License, now: i64) -> Result<()> {
    if license.status != LicenseStatus::Active {
        return Err(AppError::LicenseNotActive(license.status));
    }
    if license.is_expired_at(now) {
        return Err(AppError::LicenseExpired);
    }
    Ok(())
}
