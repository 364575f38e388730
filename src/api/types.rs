//! Shared types for the API layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use crate::db::{self, DatabaseError};

/// Shared context for all API routes.
///
/// Handlers open a connection per request; the schema is migrated once
/// when the server starts.
#[derive(Clone)]
pub struct ApiContext {
    db_path: Arc<PathBuf>,
    pub sql_row_cap: usize,
}

impl ApiContext {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            sql_row_cap: db::DEFAULT_SQL_ROW_CAP,
        }
    }

    pub fn with_sql_row_cap(mut self, cap: usize) -> Self {
        self.sql_row_cap = cap.max(1);
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_connection(&self.db_path)
    }

    /// Connection for the SQL console; SQLite refuses writes on it.
    pub fn open_read_only(&self) -> Result<Connection, DatabaseError> {
        db::open_read_only(&self.db_path)
    }
}
