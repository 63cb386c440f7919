// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! `Database` wraps the one `tokio_rusqlite::Connection`; do NOT open a second
//! connection for writes.

use std::path::Path;

use strongbox_config::model::StorageConfig;
use strongbox_core::StrongboxError;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the SQLite database holding the records table.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) the database at `path` with WAL enabled and run migrations.
    pub async fn open(path: &str) -> Result<Self, StrongboxError> {
        Self::open_with(path, true).await
    }

    /// Open the database described by a [`StorageConfig`].
    pub async fn open_config(config: &StorageConfig) -> Result<Self, StrongboxError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    /// Open (or create) the database at `path` and run migrations.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, StrongboxError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StrongboxError::backend(format!("cannot create {}", parent.display()), e)
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| StrongboxError::backend(format!("cannot open database {path}"), e))?;

        let db = Self { conn };
        db.prepare(wal_mode).await?;
        info!(path = %path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, StrongboxError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| StrongboxError::backend("cannot open in-memory database", e))?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), StrongboxError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch(
                    "PRAGMA busy_timeout = 5000;
                     PRAGMA synchronous = NORMAL;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| StrongboxError::backend("database migration failed", e))?;

        debug!("database schema up to date");
        Ok(())
    }

    /// Returns the single writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(self) -> Result<(), StrongboxError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn
            .close()
            .await
            .map_err(|e| StrongboxError::backend("failed to close database", e))
    }
}

/// Convert tokio-rusqlite errors to [`StrongboxError::BackendUnavailable`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StrongboxError {
    StrongboxError::backend("sqlite error", e)
}
