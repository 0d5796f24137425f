// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use leadpilot_core::LeadpilotError;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Cloning is cheap and every clone shares the same background writer thread.
#[derive(Clone, Debug)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` in WAL mode and runs migrations.
    pub async fn open(path: &str) -> Result<Self, LeadpilotError> {
        Self::open_with(path, true).await
    }

    /// Opens the database with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, LeadpilotError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(LeadpilotError::storage)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(LeadpilotError::storage)?;

        conn.call(move |conn| -> Result<(), LeadpilotError> {
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.pragma_update_and_check(None, "journal_mode", journal, |row| {
                row.get::<_, String>(0)
            })
            .map_err(LeadpilotError::storage)?;
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )
            .map_err(LeadpilotError::storage)?;
            migrations::run_migrations(conn)
        })
        .await
        .map_err(LeadpilotError::storage)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The shared async connection. All queries go through `call`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL and stops the background thread.
    pub async fn close(&self) -> Result<(), LeadpilotError> {
        self.checkpoint().await?;
        self.conn
            .clone()
            .close()
            .await
            .map_err(LeadpilotError::storage)
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), LeadpilotError> {
        self.conn
            .call(|conn| -> rusqlite::Result<()> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Maps a tokio-rusqlite call error into a storage error.
pub fn map_tr_err(err: tokio_rusqlite::Error<rusqlite::Error>) -> LeadpilotError {
    LeadpilotError::storage(err)
}
