mod from_row;
pub mod queries;
mod schema;

pub use schema::{init_audit_db, init_db};

use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::audit::AuditTrail;
use crate::error::{AppError, Result};
use crate::jwt::CredentialCodec;
use crate::lifecycle::Lifecycle;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on SQLite's writer lock before reporting busy.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Business records and the revocation store
    pub db: DbPool,
    /// Audit events (separate file to isolate growth)
    pub audit: AuditTrail,
    pub codec: Arc<CredentialCodec>,
    pub lifecycle: Arc<Lifecycle>,
    pub audit_default_limit: i64,
    pub audit_max_limit: i64,
    /// Deadline for store work started by a request
    pub request_timeout: Duration,
}

impl AppState {
    /// Run blocking store work on the blocking pool under the request deadline.
    ///
    /// If the deadline passes the caller gets `Timeout`; the closure still runs
    /// to completion, so any transaction it holds commits or rolls back whole.
    pub async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConn) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.db.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        });

        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AppError::Internal(format!(
                "Blocking task failed: {}",
                join_error
            ))),
            Err(_) => {
                tracing::warn!(timeout = ?self.request_timeout, "Store operation timed out");
                Err(AppError::Timeout)
            }
        }
    }

    /// Like `with_conn`, for audit-store reads.
    pub async fn with_audit<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&AuditTrail) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let audit = self.audit.clone();
        let task = tokio::task::spawn_blocking(move || f(&audit));

        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AppError::Internal(format!(
                "Blocking task failed: {}",
                join_error
            ))),
            Err(_) => Err(AppError::Timeout),
        }
    }
}

/// Open a file-backed pool. Every connection enforces foreign keys and waits
/// up to `BUSY_TIMEOUT` for the writer lock.
pub fn create_pool(database_path: &str, max_size: u32) -> std::result::Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });
    Pool::builder().max_size(max_size).build(manager)
}
