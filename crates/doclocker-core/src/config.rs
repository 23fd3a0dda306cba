// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Which blob-store backend holds the catalog, identities, and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Nothing survives the process.
    Memory,
    /// One file per key inside the data directory.
    Directory,
    /// A single SQLite key/value database inside the data directory.
    Sqlite,
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockerConfig {
    /// Backend used for the document catalog and content blobs.
    pub storage_backend: StorageBackend,
    /// Record sign-ins, uploads, downloads, and deletions in the access log.
    pub audit_enabled: bool,
    /// Create the two demo identities on startup if they are missing.
    pub seed_demo_identities: bool,
    /// How many documents the recent-activity list shows.
    pub recent_activity_limit: usize,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Sqlite,
            audit_enabled: true,
            seed_demo_identities: false,
            recent_activity_limit: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config: LockerConfig =
            serde_json::from_str(r#"{"storage_backend":"memory"}"#).expect("parse config");
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.audit_enabled);
        assert_eq!(config.recent_activity_limit, 5);
    }
}
