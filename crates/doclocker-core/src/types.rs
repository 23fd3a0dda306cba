// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Doclocker document catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LockerError;

/// Unique identifier for a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a registered identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content-addressed reference to the bytes of a document.
///
/// Rendered as `sha256:<hex digest>`; the same bytes always produce the same
/// reference, so it stays valid across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    const PREFIX: &'static str = "sha256:";

    /// Build a reference from a lowercase hex SHA-256 digest.
    pub fn from_digest(digest_hex: &str) -> Self {
        Self(format!("{}{digest_hex}", Self::PREFIX))
    }

    /// The hex digest part of the reference.
    pub fn digest(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed set of document categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Identity,
    Education,
    Employment,
    Medical,
    Financial,
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Self::Identity,
        Self::Education,
        Self::Employment,
        Self::Medical,
        Self::Financial,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Education => "Education",
            Self::Employment => "Employment",
            Self::Medical => "Medical",
            Self::Financial => "Financial",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LockerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LockerError::Validation(format!("unknown category: {s}")))
    }
}

/// Metadata for one stored document.
///
/// Fields are read-only after creation: there is no edit operation, only
/// creation by upload and removal by deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    id: DocumentId,
    name: String,
    size: u64,
    mime_type: String,
    category: Category,
    uploaded_at: DateTime<Utc>,
    owner_id: IdentityId,
    integrity_token: String,
    content_ref: ContentRef,
}

/// Everything needed to create a [`DocumentRecord`] apart from its id and
/// timestamp.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub category: Category,
    pub owner_id: IdentityId,
    pub integrity_token: String,
    pub content_ref: ContentRef,
}

impl DocumentRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: DocumentId, doc: NewDocument) -> Self {
        Self {
            id,
            name: doc.name,
            size: doc.size,
            mime_type: doc.mime_type,
            category: doc.category,
            uploaded_at: Utc::now(),
            owner_id: doc.owner_id,
            integrity_token: doc.integrity_token,
            content_ref: doc.content_ref,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn owner_id(&self) -> IdentityId {
        self.owner_id
    }

    /// SHA-256 hex digest of the content bytes.
    pub fn integrity_token(&self) -> &str {
        &self.integrity_token
    }

    pub fn content_ref(&self) -> &ContentRef {
        &self.content_ref
    }

    /// Icon class for the document's content type.
    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }
}

/// A registered identity as seen outside the security crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub display_name: String,
}

/// Category half of a document filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == category,
        }
    }

    /// Category an upload lands in when this filter is selected.
    pub fn upload_category(&self) -> Category {
        match self {
            Self::All => Category::Other,
            Self::Only(c) => *c,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = LockerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Search term plus category filter, as selected in the document list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub search: String,
    pub category: CategoryFilter,
}

impl DocumentFilter {
    pub fn new(search: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            search: search.into(),
            category,
        }
    }
}

/// Broad content class used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Pdf,
    Image,
    Word,
    Spreadsheet,
    Other,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("image") {
            Self::Image
        } else if mime.contains("word") {
            Self::Word
        } else if mime.contains("excel") || mime.contains("spreadsheet") {
            Self::Spreadsheet
        } else {
            Self::Other
        }
    }
}

/// Human-readable byte count: base 1024, at most two decimals.
///
/// `0` → `"0 Bytes"`, `1536` → `"1.5 KB"`, `1048576` → `"1 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Per-owner summary shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_documents: usize,
    pub distinct_categories: usize,
    pub total_bytes: u64,
}

impl DocumentStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DocumentRecord>) -> Self {
        let mut categories = Vec::new();
        let mut stats = Self::default();
        for record in records {
            stats.total_documents += 1;
            stats.total_bytes += record.size();
            if !categories.contains(&record.category()) {
                categories.push(record.category());
            }
        }
        stats.distinct_categories = categories.len();
        stats
    }
}
