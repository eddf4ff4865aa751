// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;

use modera_core::ModeraError;

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> ModeraError {
    ModeraError::Storage {
        source: Box::new(err),
    }
}

fn map_sql_err(err: rusqlite::Error) -> ModeraError {
    ModeraError::Storage {
        source: Box::new(err),
    }
}

/// Handle to the single-writer SQLite connection.
///
/// Opening migrates the schema and runs PRAGMA setup. Query modules accept
/// `&Database` and go through [`connection`](Database::connection).
pub struct Database {
    connection: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn open(path: &str) -> Result<Self, ModeraError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ModeraError::Storage {
                source: Box::new(e),
            })?;
        }

        // Migrate with a short-lived blocking connection before the async
        // handle opens; refinery drives plain rusqlite.
        let mut migration_conn = rusqlite::Connection::open(path).map_err(map_sql_err)?;
        run_migrations(&mut migration_conn)?;
        drop(migration_conn);

        let connection = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sql_err)?;

        // journal_mode persists in the file; foreign_keys and busy_timeout
        // are per-connection and must be set on the long-lived handle.
        connection
            .call(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(path, "database opened and migrated");
        Ok(Self { connection })
    }

    /// The underlying tokio-rusqlite connection (the single writer).
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.connection
    }

    /// Checkpoint the WAL.
    pub async fn close(&self) -> Result<(), ModeraError> {
        self.connection
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
