// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-selection boundary: what the UI hands over when the user picks a file.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// MIME type used when nothing better is known.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// A file chosen by the user, described by its own metadata.
///
/// Upload intake never inspects content to derive metadata; it only reads the
/// bytes to store and fingerprint them.
pub trait FileHandle {
    /// Original file name as shown to the user.
    fn name(&self) -> &str;

    /// Size in bytes as reported by the file's metadata.
    fn size(&self) -> u64;

    /// Declared content type.
    fn mime_type(&self) -> &str;

    /// Read the full content.
    fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// A file already held in memory (e.g. delivered by a browser or picker).
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

impl FileHandle for SelectedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct PathFile {
    path: PathBuf,
    name: String,
    size: u64,
    mime_type: &'static str,
}

impl PathFile {
    /// Stat `path` and capture its name, size, and extension-derived MIME type.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = path
            .extension()
            .and_then(|ext| mime_from_extension(&ext.to_string_lossy()))
            .unwrap_or(FALLBACK_MIME);

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            mime_type,
        })
    }
}

impl FileHandle for PathFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> &str {
        self.mime_type
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Infer a MIME type from a file extension.
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "xls" => Some("application/vnd.ms-excel"),
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileKind;

    #[test]
    fn selected_file_reports_byte_length() {
        let file = SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert_eq!(file.size(), 5);
        assert_eq!(file.read_bytes().unwrap(), b"hello");
    }

    #[test]
    fn office_extensions_map_to_icon_kinds() {
        let docx = mime_from_extension("DOCX").unwrap();
        let xlsx = mime_from_extension("xlsx").unwrap();
        assert_eq!(FileKind::from_mime(docx), FileKind::Word);
        assert_eq!(FileKind::from_mime(xlsx), FileKind::Spreadsheet);
        assert_eq!(mime_from_extension("exe"), None);
    }

    #[test]
    fn path_file_missing_is_io_error() {
        let err = PathFile::open("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, crate::error::LockerError::Io(_)));
    }
}
