// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Doclocker catalog: the document record store, content store, query
// engine, and upload intake, plus the durable blob-store backends they
// persist through.

pub mod backends;
pub mod content;
pub mod intake;
pub mod query;
pub mod records;

pub use backends::{DirectoryBlobStore, SqliteBlobStore};
pub use content::ContentStore;
pub use intake::intake;
pub use query::{query, query_filter, recent};
pub use records::{DOCUMENTS_KEY, DocumentStore};

#[cfg(test)]
pub(crate) mod test_support {
    use doclocker_core::types::{
        Category, ContentRef, DocumentId, DocumentRecord, IdentityId, NewDocument,
    };

    /// A record with placeholder content for catalog tests.
    pub fn record_for(owner: IdentityId, name: &str, category: Category) -> DocumentRecord {
        DocumentRecord::new(
            DocumentId::new(),
            NewDocument {
                name: name.to_owned(),
                size: name.len() as u64,
                mime_type: "application/pdf".to_owned(),
                category,
                owner_id: owner,
                integrity_token: "00".repeat(32),
                content_ref: ContentRef::from_digest(&"00".repeat(32)),
            },
        )
    }
}
