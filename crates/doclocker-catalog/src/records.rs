// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document record store.
//
// Holds the full sequence of document records for every identity, in
// insertion order, and persists it as one JSON array under a fixed blob key.
// Every save writes the complete snapshot, so loading after any save yields
// exactly the in-memory sequence that was saved.

use std::collections::HashSet;
use std::sync::Arc;

use doclocker_core::blob::BlobStore;
use doclocker_core::error::Result;
use doclocker_core::types::{ContentRef, DocumentId, DocumentRecord};
use doclocker_security::integrity::quarantine_blob;
use tracing::{debug, error, info, instrument, warn};

/// Blob-store key holding the serialized document collection.
pub const DOCUMENTS_KEY: &str = "digilocker-documents";

/// Serialize records to the persisted JSON array format.
pub fn encode_records(records: &[DocumentRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

/// Parse the persisted JSON array format.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<DocumentRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Keep the first record for each id.
fn dedup_ids(decoded: Vec<DocumentRecord>) -> Vec<DocumentRecord> {
    let mut seen = HashSet::with_capacity(decoded.len());
    decoded
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(record.id());
            if !fresh {
                warn!(document_id = %record.id(), "dropping duplicate document id");
            }
            fresh
        })
        .collect()
}

/// In-memory record sequence plus the blob store it persists to.
pub struct DocumentStore {
    records: Vec<DocumentRecord>,
    store: Arc<dyn BlobStore>,
}

impl DocumentStore {
    /// Restore the collection from `store`.
    ///
    /// Never fails: a missing blob, a read error, or a corrupt payload all
    /// produce an empty collection (the latter two are logged).  A corrupt
    /// payload is copied aside with [`quarantine_blob`] first, so the next
    /// save does not destroy the records it held.
    #[instrument(skip_all)]
    pub fn load(store: Arc<dyn BlobStore>) -> Self {
        let records = match store.get(DOCUMENTS_KEY) {
            Ok(Some(bytes)) => match decode_records(&bytes) {
                Ok(decoded) => dedup_ids(decoded),
                Err(e) => {
                    match quarantine_blob(store.as_ref(), DOCUMENTS_KEY, &bytes) {
                        Ok(copy) => warn!(
                            error = %e,
                            quarantine = %copy,
                            "document catalog is corrupt; starting empty"
                        ),
                        Err(qe) => error!(
                            error = %e,
                            quarantine_error = %qe,
                            "document catalog is corrupt and could not be copied aside"
                        ),
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "document catalog unreadable; starting empty");
                Vec::new()
            }
        };

        info!(count = records.len(), "document catalog loaded");
        Self { records, store }
    }

    /// Write the complete collection, replacing whatever was stored.
    #[instrument(skip(self), fields(count = self.records.len()))]
    pub fn save(&self) -> Result<()> {
        let bytes = encode_records(&self.records)?;
        self.store.set(DOCUMENTS_KEY, &bytes)?;
        debug!(bytes = bytes.len(), "document catalog saved");
        Ok(())
    }

    /// Append a record.  Id uniqueness is the caller's responsibility.
    pub fn add(&mut self, record: DocumentRecord) {
        self.records.push(record);
    }

    /// Remove the record with `id`, returning it.  Absent ids are a no-op.
    pub fn remove(&mut self, id: DocumentId) -> Option<DocumentRecord> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(index))
    }

    /// `add` followed by `save`; the record is dropped again if the save fails.
    pub fn add_and_save(&mut self, record: DocumentRecord) -> Result<()> {
        self.add(record);
        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// `remove` followed by `save`; the record is restored in place if the
    /// save fails.  Returns `Ok(None)` without saving when `id` is absent.
    pub fn remove_and_save(&mut self, id: DocumentId) -> Result<Option<DocumentRecord>> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(index);
        if let Err(e) = self.save() {
            self.records.insert(index, removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Whether any record still points at `content`.
    pub fn references(&self, content: &ContentRef) -> bool {
        self.records.iter().any(|r| r.content_ref() == content)
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use doclocker_core::blob::MemoryBlobStore;
    use doclocker_core::error::LockerError;
    use doclocker_core::types::{Category, IdentityId, NewDocument};
    use doclocker_security::integrity::quarantine_key;

    use super::*;
    use crate::test_support::record_for;

    /// Blob store whose writes always fail.
    struct ReadOnlyStore(MemoryBlobStore);

    impl BlobStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.0.get(key)
        }
        fn set(&self, key: &str, _value: &[u8]) -> Result<()> {
            Err(LockerError::Persistence(format!("{key} is read-only")))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(LockerError::Persistence("read-only".into()))
        }
    }

    fn memory() -> Arc<dyn BlobStore> {
        Arc::new(MemoryBlobStore::new())
    }

    #[test]
    fn missing_blob_loads_empty() {
        assert!(DocumentStore::load(memory()).is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let blobs = memory();
        let owner = IdentityId::new();
        let mut store = DocumentStore::load(Arc::clone(&blobs));
        store.add(record_for(owner, "passport.pdf", Category::Identity));
        store.add(record_for(owner, "resume.pdf", Category::Employment));
        store.add(record_for(IdentityId::new(), "x-ray.png", Category::Medical));
        store.save().unwrap();

        let reloaded = DocumentStore::load(blobs);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn persisted_format_is_camel_case_array() {
        let blobs = memory();
        let mut store = DocumentStore::load(Arc::clone(&blobs));
        store.add(record_for(IdentityId::new(), "a.pdf", Category::Financial));
        store.save().unwrap();

        let raw = blobs.get(DOCUMENTS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["category"], "Financial");
        assert!(first.get("uploadedAt").is_some());
        assert!(first.get("integrityToken").is_some());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let blobs = memory();
        blobs.set(DOCUMENTS_KEY, b"not json at all").unwrap();
        assert!(DocumentStore::load(blobs).is_empty());
    }

    #[test]
    fn saving_after_corruption_keeps_the_damaged_catalog() {
        let blobs = memory();
        let owner = IdentityId::new();
        let mut store = DocumentStore::load(Arc::clone(&blobs));
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            store.add(record_for(owner, name, Category::Other));
        }
        store.save().unwrap();

        let mut damaged = blobs.get(DOCUMENTS_KEY).unwrap().unwrap();
        let last = damaged.len() - 1;
        damaged[last] = b' ';
        blobs.set(DOCUMENTS_KEY, &damaged).unwrap();

        let mut reloaded = DocumentStore::load(Arc::clone(&blobs));
        assert!(reloaded.is_empty());
        reloaded
            .add_and_save(record_for(owner, "d.pdf", Category::Other))
            .unwrap();

        let copy = blobs
            .get(&quarantine_key(DOCUMENTS_KEY, &damaged))
            .unwrap()
            .expect("damaged catalog copied aside");
        assert_eq!(copy, damaged);

        // Restoring the closing bracket recovers all three records.
        let mut repaired = copy;
        repaired[last] = b']';
        assert_eq!(decode_records(&repaired).unwrap(), store.records());
    }

    #[test]
    fn unknown_category_loads_empty() {
        let blobs = memory();
        let mut store = DocumentStore::load(Arc::clone(&blobs));
        store.add(record_for(IdentityId::new(), "a.pdf", Category::Other));
        store.save().unwrap();

        let raw = blobs.get(DOCUMENTS_KEY).unwrap().unwrap();
        let tampered = String::from_utf8(raw).unwrap().replace("\"Other\"", "\"Secret\"");
        blobs.set(DOCUMENTS_KEY, tampered.as_bytes()).unwrap();

        assert!(DocumentStore::load(blobs).is_empty());
    }

    #[test]
    fn duplicate_ids_are_dropped_on_load() {
        let blobs = memory();
        let rec = record_for(IdentityId::new(), "a.pdf", Category::Other);
        let bytes = encode_records(&[rec.clone(), rec.clone()]).unwrap();
        blobs.set(DOCUMENTS_KEY, &bytes).unwrap();

        let store = DocumentStore::load(blobs);
        assert_eq!(store.records(), &[rec]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = DocumentStore::load(memory());
        let owner = IdentityId::new();
        let keep = record_for(owner, "keep.pdf", Category::Other);
        let gone = record_for(owner, "gone.pdf", Category::Other);
        store.add(keep.clone());
        store.add(gone.clone());

        assert_eq!(store.remove(gone.id()), Some(gone.clone()));
        let after_first = store.records().to_vec();
        assert_eq!(store.remove(gone.id()), None);
        assert_eq!(store.records(), after_first.as_slice());
        assert_eq!(store.records(), &[keep]);
    }

    #[test]
    fn emptying_the_store_is_persisted() {
        let blobs = memory();
        let mut store = DocumentStore::load(Arc::clone(&blobs));
        let rec = record_for(IdentityId::new(), "a.pdf", Category::Other);
        store.add_and_save(rec.clone()).unwrap();
        store.remove_and_save(rec.id()).unwrap();

        assert!(DocumentStore::load(blobs).is_empty());
    }

    #[test]
    fn failed_save_rolls_back_add() {
        let mut store = DocumentStore::load(Arc::new(ReadOnlyStore(MemoryBlobStore::new())));
        let rec = record_for(IdentityId::new(), "a.pdf", Category::Other);
        assert!(matches!(store.add_and_save(rec), Err(LockerError::Persistence(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_save_restores_removed_record_in_place() {
        let inner = MemoryBlobStore::new();
        let owner = IdentityId::new();
        let records = vec![
            record_for(owner, "a.pdf", Category::Other),
            record_for(owner, "b.pdf", Category::Other),
            record_for(owner, "c.pdf", Category::Other),
        ];
        inner.set(DOCUMENTS_KEY, &encode_records(&records).unwrap()).unwrap();

        let mut store = DocumentStore::load(Arc::new(ReadOnlyStore(inner)));
        assert!(store.remove_and_save(records[1].id()).is_err());
        assert_eq!(store.records(), records.as_slice());
    }

    #[test]
    fn references_tracks_shared_content() {
        let mut store = DocumentStore::load(memory());
        let owner = IdentityId::new();
        let a = DocumentRecord::new(
            DocumentId::new(),
            NewDocument {
                name: "a.pdf".into(),
                size: 1,
                mime_type: "application/pdf".into(),
                category: Category::Other,
                owner_id: owner,
                integrity_token: "ff".into(),
                content_ref: ContentRef::from_digest("ff"),
            },
        );
        store.add(a.clone());
        assert!(store.references(&ContentRef::from_digest("ff")));
        store.remove(a.id());
        assert!(!store.references(&ContentRef::from_digest("ff")));
    }
}
