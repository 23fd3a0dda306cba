// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload intake: turns a selected file into a stored document record.

use doclocker_core::error::{LockerError, Result};
use doclocker_core::file::{FALLBACK_MIME, FileHandle};
use doclocker_core::types::{Category, DocumentId, DocumentRecord, IdentityId, NewDocument};
use doclocker_security::integrity::integrity_token;
use tracing::{info, instrument, warn};

use crate::content::ContentStore;
use crate::records::DocumentStore;

/// A fresh document id not used by any record in `documents`.
pub fn fresh_document_id(documents: &DocumentStore) -> DocumentId {
    loop {
        let id = DocumentId::new();
        if !documents.contains(id) {
            return id;
        }
    }
}

/// Store `file` for `owner` and append its record to the catalog.
///
/// Name, size, and MIME type come from the handle's own metadata.  The bytes
/// are fingerprinted with SHA-256 and written to `content` before the record
/// is saved; if the catalog save fails, newly written content that nothing
/// references is removed again.
#[instrument(skip_all, fields(%owner))]
pub fn intake(
    file: Option<&dyn FileHandle>,
    category: Option<Category>,
    owner: IdentityId,
    documents: &mut DocumentStore,
    content: &ContentStore,
) -> Result<DocumentRecord> {
    let file = file.ok_or_else(|| LockerError::Validation("no file selected".into()))?;

    let name = file.name().trim();
    if name.is_empty() {
        return Err(LockerError::Validation("file has no name".into()));
    }

    let bytes = file
        .read_bytes()
        .map_err(|e| LockerError::Validation(format!("could not read {name}: {e}")))?;
    if bytes.len() as u64 != file.size() {
        warn!(
            declared = file.size(),
            actual = bytes.len(),
            "file size changed since selection"
        );
    }

    let mime_type = match file.mime_type().trim() {
        "" => FALLBACK_MIME.to_owned(),
        mime => mime.to_owned(),
    };

    let token = integrity_token(&bytes);
    let content_ref = content.put(&bytes)?;

    let record = DocumentRecord::new(
        fresh_document_id(documents),
        NewDocument {
            name: name.to_owned(),
            size: file.size(),
            mime_type,
            category: category.unwrap_or_default(),
            owner_id: owner,
            integrity_token: token,
            content_ref,
        },
    );

    if let Err(e) = documents.add_and_save(record.clone()) {
        if !documents.references(record.content_ref())
            && let Err(cleanup) = content.remove(record.content_ref())
        {
            warn!(error = %cleanup, "failed to remove orphaned content");
        }
        return Err(e);
    }

    info!(document_id = %record.id(), size = record.size(), "document stored");
    Ok(record)
}
