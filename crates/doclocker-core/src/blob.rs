// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key/value blob store boundary.
//
// The catalog, the identity directory, and document content all persist
// through this trait.  Durable backends live in `doclocker-catalog`; the
// in-memory backend here is used for tests and the `memory` storage mode.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{LockerError, Result};

/// Minimal key/value storage for opaque byte blobs.
///
/// `set` overwrites any previous value under the same key.  `remove` on an
/// absent key is not an error.
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete the blob stored under `key`.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local blob store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.blobs
            .lock()
            .map_err(|_| LockerError::Persistence("memory blob store lock poisoned".into()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", b"one").unwrap();
        store.set("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"two"[..]));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
