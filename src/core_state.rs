//! Transport-agnostic application state.
//!
//! `CoreState` is built once at startup and shared behind an `Arc` by
//! every request. It holds only immutable settings; each request opens
//! its own SQLite connection through [`CoreState::open_db`].

use std::path::PathBuf;

use rusqlite::Connection;

use crate::authorization::CareLinkPolicy;
use crate::config::Config;
use crate::crypto::CryptoError;
use crate::db::{self, repository};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CoreState {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Lifetime of an issued bearer token.
    pub token_ttl: chrono::Duration,
    /// PBKDF2 work factor for newly hashed passwords.
    pub password_iterations: u32,
    pub care_link: CareLinkPolicy,
    pub audit_retention_days: u32,
}

impl CoreState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            db_path: config.db_path.clone(),
            token_ttl: chrono::Duration::hours(config.token_ttl_hours),
            password_iterations: config.password_iterations,
            care_link: if config.require_care_link {
                CareLinkPolicy::Required
            } else {
                CareLinkPolicy::Unchecked
            },
            audit_retention_days: config.audit_retention_days,
        }
    }

    /// Open a database connection for the current request.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Create the data directory, migrate, and prune stale sessions and
    /// audit rows. Called once before the server starts accepting requests.
    pub fn initialize(&self) -> Result<(), CoreError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = self.open_db()?;

        let expired = repository::prune_expired_sessions(&conn, &db::now_timestamp())?;
        if let Err(e) = repository::prune_audit_log(&conn, self.audit_retention_days) {
            tracing::warn!("Failed to prune audit log: {e}");
        }
        tracing::info!(
            db_path = %self.db_path.display(),
            expired_sessions = expired,
            "Database ready"
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Audit logging
// ═══════════════════════════════════════════════════════════

/// Append an audit entry. Best-effort: a failed write is logged and
/// never propagated, so it cannot undo the action it describes.
pub fn log_audit(conn: &Connection, user_id: Option<i64>, action: &str, entity: Option<&str>) {
    if let Err(e) = repository::insert_audit_entry(conn, user_id, action, entity) {
        tracing::warn!(action, "Failed to write audit entry: {e}");
    }
}

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Credential error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(db::DatabaseError::from(err))
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// State over a fresh database file with a cheap password work factor.
    pub(crate) fn test_state(dir: &tempfile::TempDir) -> CoreState {
        CoreState {
            db_path: dir.path().join("test.db"),
            token_ttl: chrono::Duration::hours(1),
            password_iterations: 1_000,
            care_link: CareLinkPolicy::Required,
            audit_retention_days: 30,
        }
    }

    #[test]
    fn from_config_maps_care_link_flag() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.require_care_link = false;
        let state = CoreState::from_config(&config);
        assert_eq!(state.care_link, CareLinkPolicy::Unchecked);
        assert_eq!(state.token_ttl, chrono::Duration::hours(24));
    }

    #[test]
    fn initialize_creates_directory_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = test_state(&dir);
        state.db_path = dir.path().join("nested").join("pf.db");

        state.initialize().unwrap();
        assert!(state.db_path.exists());
        let conn = state.open_db().unwrap();
        assert_eq!(db::get_current_version(&conn), 2);
    }

    #[test]
    fn log_audit_writes_row() {
        let conn = db::open_memory_database().unwrap();
        log_audit(&conn, Some(3), "baseline.set", None);
        let entries = repository::list_audit_entries(&conn, 3).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "baseline.set");
    }
}
