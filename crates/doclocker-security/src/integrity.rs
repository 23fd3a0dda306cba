// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document integrity: SHA-256 fingerprints stored with every record.

use doclocker_core::blob::BlobStore;
use doclocker_core::error::{LockerError, Result};
use doclocker_core::types::ContentRef;
use sha2::{Digest, Sha256};

/// SHA-256 of `data` as a lowercase hex string.
///
/// This is the `integrity_token` of a document record and the digest part of
/// its content reference.
pub fn integrity_token(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Content-addressed reference for `data`.
pub fn content_ref_for(data: &[u8]) -> ContentRef {
    ContentRef::from_digest(&integrity_token(data))
}

/// Check `data` against a previously recorded integrity token.
///
/// Hex case is ignored.  On mismatch the error carries both digests.
pub fn verify_integrity(data: &[u8], expected_hex: &str) -> Result<()> {
    let actual = integrity_token(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(LockerError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}

/// Blob-store key that [`quarantine_blob`] copies `data` to.
pub fn quarantine_key(key: &str, data: &[u8]) -> String {
    format!("{key}.corrupt-{}", integrity_token(data))
}

/// Copy an undecodable blob stored under `key` aside before its owner starts
/// over with an empty collection, so the next save of `key` cannot destroy
/// it.  The copy is keyed by digest, so quarantining the same bytes twice
/// writes one copy.  Returns the key of the copy.
pub fn quarantine_blob(store: &dyn BlobStore, key: &str, data: &[u8]) -> Result<String> {
    let target = quarantine_key(key, data);
    if store.get(&target)?.is_none() {
        store.set(&target, data)?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn token_of_empty_input() {
        assert_eq!(integrity_token(b""), EMPTY_SHA256);
    }

    #[test]
    fn token_of_known_value() {
        // SHA-256("hello"): verified against coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(integrity_token(b"hello"), expected);
        assert_eq!(content_ref_for(b"hello").digest(), expected);
    }

    #[test]
    fn verify_accepts_uppercase_hex() {
        let token = integrity_token(b"passport scan").to_ascii_uppercase();
        assert!(verify_integrity(b"passport scan", &token).is_ok());
    }

    #[test]
    fn verify_reports_both_digests() {
        match verify_integrity(b"a", "0000") {
            Err(LockerError::IntegrityMismatch { expected, actual }) => {
                assert_eq!(expected, "0000");
                assert_eq!(actual, integrity_token(b"a"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn quarantine_keeps_a_copy_by_digest() {
        let store = doclocker_core::blob::MemoryBlobStore::new();
        let target = quarantine_blob(&store, "catalog", b"[{broken").unwrap();

        assert_eq!(target, format!("catalog.corrupt-{}", integrity_token(b"[{broken")));
        assert_eq!(store.get(&target).unwrap().as_deref(), Some(&b"[{broken"[..]));
        assert_eq!(quarantine_blob(&store, "catalog", b"[{broken").unwrap(), target);
    }
}
