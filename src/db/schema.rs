use rusqlite::Connection;

/// Initialize the main database schema: business records and the revocation store.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Organizations (tenants). Only the name changes after creation.
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Operators (administrative identities). API keys are stored hashed.
        CREATE TABLE IF NOT EXISTS operators (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('owner', 'admin', 'view')),
            api_key_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            created_by TEXT REFERENCES operators(id) ON DELETE SET NULL
        );

        -- Licenses are never deleted, only moved to 'cancelled'.
        -- Expiry is evaluated at use time; status is not transitioned eagerly.
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            license_key TEXT NOT NULL UNIQUE,
            organization_id TEXT NOT NULL REFERENCES organizations(id),
            plan TEXT NOT NULL CHECK (plan IN ('basic', 'pro', 'max')),
            status TEXT NOT NULL CHECK (status IN ('active', 'suspended', 'expired', 'cancelled')),
            seats_editor INTEGER NOT NULL CHECK (seats_editor >= 1),
            seats_player INTEGER NOT NULL CHECK (seats_player >= 1),
            valid_from INTEGER NOT NULL,
            valid_until INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            CHECK (valid_until > valid_from)
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_org ON licenses(organization_id);
        CREATE INDEX IF NOT EXISTS idx_licenses_status ON licenses(status);

        -- Devices. A deactivated row is terminal; reactivating the same identifier
        -- creates a new row, so uniqueness only applies to active rows.
        CREATE TABLE IF NOT EXISTS devices (
            id TEXT PRIMARY KEY,
            device_identifier TEXT NOT NULL,
            license_id TEXT NOT NULL REFERENCES licenses(id),
            application_kind TEXT NOT NULL CHECK (application_kind IN ('editor', 'player')),
            name TEXT,
            os_info TEXT,
            status TEXT NOT NULL CHECK (status IN ('active', 'deactivated')),
            activated_at INTEGER NOT NULL,
            deactivated_at INTEGER,
            last_seen_at INTEGER NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_devices_active_unique
            ON devices(license_id, device_identifier, application_kind) WHERE status = 'active';
        CREATE INDEX IF NOT EXISTS idx_devices_seat_count
            ON devices(license_id, application_kind, status);
        CREATE INDEX IF NOT EXISTS idx_devices_identifier ON devices(device_identifier);

        -- Revocation store. Every issued credential has exactly one owner.
        -- A credential missing from this table is treated as revoked.
        CREATE TABLE IF NOT EXISTS credentials (
            credential_id TEXT PRIMARY KEY,
            device_id TEXT REFERENCES devices(id) ON DELETE CASCADE,
            operator_id TEXT REFERENCES operators(id) ON DELETE CASCADE,
            content_hash TEXT NOT NULL,
            issued_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            revoked_at INTEGER,
            CHECK ((device_id IS NULL) != (operator_id IS NULL))
        );
        CREATE INDEX IF NOT EXISTS idx_credentials_device ON credentials(device_id);
        CREATE INDEX IF NOT EXISTS idx_credentials_operator ON credentials(operator_id);
        CREATE INDEX IF NOT EXISTS idx_credentials_expires ON credentials(expires_at);
        "#,
    )?;
    Ok(())
}

/// Initialize the audit database schema (separate DB file)
/// Optimized for append-only workload with WAL mode
pub fn init_audit_db(conn: &Connection) -> rusqlite::Result<()> {
    // synchronous=NORMAL is safe with WAL
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 1000;
        PRAGMA journal_size_limit = 67108864;

        CREATE TABLE IF NOT EXISTS audit_events (
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            action TEXT NOT NULL,
            actor_type TEXT NOT NULL CHECK (actor_type IN ('operator', 'device', 'system')),
            actor_id TEXT,                        -- operator id or device identifier
            device_id TEXT,
            license_id TEXT,
            details TEXT,                         -- JSON
            ip_address TEXT,
            user_agent TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_audit_events_time ON audit_events(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_audit_events_action ON audit_events(action, created_at);
        CREATE INDEX IF NOT EXISTS idx_audit_events_actor ON audit_events(actor_id);
        CREATE INDEX IF NOT EXISTS idx_audit_events_device ON audit_events(device_id);
        CREATE INDEX IF NOT EXISTS idx_audit_events_license ON audit_events(license_id);
        "#,
    )?;
    Ok(())
}
