// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content store: document bytes keyed by their SHA-256 digest.
//
// Identical uploads share one blob.  Reads re-hash the bytes and refuse to
// return content whose digest no longer matches its key.

use std::sync::Arc;

use doclocker_core::blob::BlobStore;
use doclocker_core::error::{LockerError, Result};
use doclocker_core::types::ContentRef;
use doclocker_security::integrity::{content_ref_for, verify_integrity};
use tracing::{debug, instrument, warn};

/// Content-addressed byte storage on top of a blob store.
#[derive(Clone)]
pub struct ContentStore {
    store: Arc<dyn BlobStore>,
}

impl ContentStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    fn key(content: &ContentRef) -> String {
        format!("content/{}", content.digest())
    }

    /// Store `bytes` and return their reference.
    ///
    /// Intact stored content is not rewritten; a stored blob whose digest no
    /// longer matches its key is replaced with `bytes`.
    #[instrument(skip_all, fields(len = bytes.len()))]
    pub fn put(&self, bytes: &[u8]) -> Result<ContentRef> {
        let content = content_ref_for(bytes);
        let key = Self::key(&content);
        match self.store.get(&key)? {
            Some(stored) if verify_integrity(&stored, content.digest()).is_ok() => {
                debug!(%content, "content already present");
            }
            Some(_) => {
                self.store.set(&key, bytes)?;
                warn!(%content, "damaged content replaced");
            }
            None => {
                self.store.set(&key, bytes)?;
                debug!(%content, "content stored");
            }
        }
        Ok(content)
    }

    /// Fetch and verify the bytes behind `content`.
    #[instrument(skip_all, fields(%content))]
    pub fn get(&self, content: &ContentRef) -> Result<Vec<u8>> {
        let bytes = self
            .store
            .get(&Self::key(content))?
            .ok_or_else(|| LockerError::NotFound(format!("content {content}")))?;
        verify_integrity(&bytes, content.digest())?;
        Ok(bytes)
    }

    /// Drop the bytes behind `content`.  Absent content is a no-op.
    pub fn remove(&self, content: &ContentRef) -> Result<()> {
        self.store.remove(&Self::key(content))
    }
}

#[cfg(test)]
mod tests {
    use doclocker_core::blob::MemoryBlobStore;

    use super::*;

    #[test]
    fn put_get_remove() {
        let store = ContentStore::new(Arc::new(MemoryBlobStore::new()));
        let content = store.put(b"scan of a passport").unwrap();
        assert_eq!(store.get(&content).unwrap(), b"scan of a passport");

        store.remove(&content).unwrap();
        assert!(matches!(store.get(&content), Err(LockerError::NotFound(_))));
    }

    #[test]
    fn identical_bytes_share_a_reference() {
        let store = ContentStore::new(Arc::new(MemoryBlobStore::new()));
        assert_eq!(store.put(b"same").unwrap(), store.put(b"same").unwrap());
        assert_ne!(store.put(b"same").unwrap(), store.put(b"other").unwrap());
    }

    #[test]
    fn tampered_content_is_rejected() {
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let store = ContentStore::new(Arc::clone(&blobs));
        let content = store.put(b"original").unwrap();

        blobs
            .set(&format!("content/{}", content.digest()), b"tampered")
            .unwrap();

        assert!(matches!(
            store.get(&content),
            Err(LockerError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn reupload_repairs_damaged_content() {
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let store = ContentStore::new(Arc::clone(&blobs));
        let content = store.put(b"original").unwrap();
        blobs
            .set(&format!("content/{}", content.digest()), b"tampered")
            .unwrap();

        assert_eq!(store.put(b"original").unwrap(), content);
        assert_eq!(store.get(&content).unwrap(), b"original");
    }
}
