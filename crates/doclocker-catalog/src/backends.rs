// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Durable blob-store backends.
//
// `DirectoryBlobStore` keeps one file per key and replaces files atomically
// (write to a temp file, then rename).  `SqliteBlobStore` keeps every blob in
// a single key/value table.  Both satisfy the overwrite-on-set contract of
// `BlobStore`, so a saved catalog snapshot is always complete.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use doclocker_core::blob::BlobStore;
use doclocker_core::error::{LockerError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};

fn persistence_err(op: &str, key: &str, e: impl std::fmt::Display) -> LockerError {
    LockerError::Persistence(format!("{op} {key}: {e}"))
}

// ---------------------------------------------------------------------------
// Directory backend
// ---------------------------------------------------------------------------

/// Blob store that maps each key to a file under a root directory.
///
/// Keys may contain `/` to create sub-directories (e.g. `content/<digest>`).
/// Segments are restricted to ASCII letters, digits, `-`, `_`, and `.`, and
/// may not be `.` or `..`.
#[derive(Debug, Clone)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    /// Use `root` as the store directory, creating it if needed.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| persistence_err("create", &root.display().to_string(), e))?;
        info!("directory blob store opened");
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            let valid = !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if !valid {
                return Err(LockerError::Validation(format!("invalid blob key: {key:?}")));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl BlobStore for DirectoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(persistence_err("read", key, e)),
        }
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| persistence_err("create", key, e))?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, value).map_err(|e| persistence_err("write", key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| persistence_err("rename", key, e))?;

        debug!("blob written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(persistence_err("remove", key, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

const CREATE_BLOBS_SQL: &str = "
    CREATE TABLE IF NOT EXISTS blobs (
        key        TEXT PRIMARY KEY,
        value      BLOB NOT NULL,
        updated_at TEXT NOT NULL
    )
";

fn db_err(e: rusqlite::Error) -> LockerError {
    LockerError::Database(e.to_string())
}

/// Blob store backed by a single SQLite table.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so it sits behind a
/// `Mutex`; every operation is a single short statement.
pub struct SqliteBlobStore {
    conn: Mutex<Connection>,
}

impl SqliteBlobStore {
    /// Open (or create) the database at `path` in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_BLOBS_SQL).map_err(db_err)?;

        info!("sqlite blob store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_BLOBS_SQL).map_err(db_err)?;

        debug!("in-memory sqlite blob store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LockerError::Persistence("sqlite blob store lock poisoned".into()))
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn()?
            .query_row("SELECT value FROM blobs WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_err)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(db_err)?;

        debug!("blob written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM blobs WHERE key = ?1", params![key])
            .map_err(db_err)?;
        Ok(())
    }
}
