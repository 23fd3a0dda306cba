// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Access log: append-only SQLite record of sign-ins and document access.
//
// Schema:
//   access_log(
//     id        INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp TEXT    NOT NULL,   -- RFC 3339
//     action    TEXT    NOT NULL,   -- see `AccessAction`
//     actor     TEXT    NOT NULL,   -- email or identity id
//     subject   TEXT,               -- document id, when one is involved
//     success   INTEGER NOT NULL,   -- 0 = failure, 1 = success
//     details   TEXT                -- optional free-form context
//   )
//
// The log is informational.  Writes are not fsync'd beyond SQLite defaults
// and callers treat a failed write as a warning, not an operation failure.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use doclocker_core::error::{LockerError, Result};
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS access_log (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT    NOT NULL,
        action    TEXT    NOT NULL,
        actor     TEXT    NOT NULL,
        subject   TEXT,
        success   INTEGER NOT NULL,
        details   TEXT
    );
    CREATE INDEX IF NOT EXISTS access_log_subject ON access_log(subject);
";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, action, actor, subject, success, details FROM access_log";

fn db_err(e: rusqlite::Error) -> LockerError {
    LockerError::Database(e.to_string())
}

/// Operations worth recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessAction {
    SignIn,
    Register,
    SignOut,
    Upload,
    Download,
    Delete,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::Register => "register",
            Self::SignOut => "sign_out",
            Self::Upload => "upload",
            Self::Download => "download",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of the access log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessEntry {
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub actor: String,
    pub subject: Option<String>,
    pub success: bool,
    pub details: Option<String>,
}

impl AccessEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            action: row.get(2)?,
            actor: row.get(3)?,
            subject: row.get(4)?,
            success: row.get::<_, i32>(5)? != 0,
            details: row.get(6)?,
        })
    }
}

/// Append-only access log backed by SQLite.
pub struct AccessLog {
    conn: Connection,
}

impl AccessLog {
    /// Open (or create) the access log database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("access log opened");
        Ok(Self { conn })
    }

    /// Open an in-memory access log (memory storage mode and tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory access log opened");
        Ok(Self { conn })
    }

    /// Append one entry.
    #[instrument(skip(self, details), fields(%action, %actor, success))]
    pub fn record(
        &self,
        action: AccessAction,
        actor: &str,
        subject: Option<&str>,
        success: bool,
        details: Option<&str>,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO access_log (timestamp, action, actor, subject, success, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Utc::now().to_rfc3339(),
                    action.as_str(),
                    actor,
                    subject,
                    i32::from(success),
                    details
                ],
            )
            .map_err(db_err)?;

        debug!("access entry recorded");
        Ok(())
    }

    /// All entries about `subject` (usually a document id), oldest first.
    pub fn entries_for_subject(&self, subject: &str) -> Result<Vec<AccessEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE subject = ?1 ORDER BY id ASC"))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![subject], AccessEntry::from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }

    /// The most recent `limit` entries for `actor`, newest first.
    pub fn recent_for_actor(&self, actor: &str, limit: u32) -> Result<Vec<AccessEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE actor = ?1 ORDER BY id DESC LIMIT ?2"))
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![actor, limit], AccessEntry::from_row)
            .map_err(db_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_err)
    }
}
