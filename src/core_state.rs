//! Shared application state.
//!
//! `CoreState` owns the database connection and the runtime
//! configuration. It is wrapped in `Arc` at startup and handed to the
//! router; handlers borrow the connection through [`CoreState::lock_db`].

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    /// Single SQLite connection. The mutex serializes writers; each
    /// composite write additionally runs in its own transaction.
    db: Mutex<Connection>,
    /// Resolved configuration.
    pub config: AppConfig,
}

impl CoreState {
    /// Open (or create) the database at `config.db_path`.
    pub fn open(config: AppConfig) -> Result<Self, CoreError> {
        let conn = db::open_database(&config.db_path)?;
        tracing::info!(path = %config.db_path.display(), "Database ready");
        Ok(Self::with_connection(conn, config))
    }

    /// Fresh in-memory database (tests, demos).
    pub fn in_memory(config: AppConfig) -> Result<Self, CoreError> {
        let conn = db::open_memory_database()?;
        Ok(Self::with_connection(conn, config))
    }

    pub fn with_connection(conn: Connection, config: AppConfig) -> Self {
        Self {
            db: Mutex::new(conn),
            config,
        }
    }

    /// Borrow the connection for the duration of one unit of work.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }
}

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
