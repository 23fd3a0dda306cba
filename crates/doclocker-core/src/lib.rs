// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Doclocker: Core types, error definitions, and storage boundaries shared
// across all crates.

pub mod blob;
pub mod config;
pub mod error;
pub mod file;
pub mod human_errors;
pub mod types;

pub use blob::{BlobStore, MemoryBlobStore};
pub use config::{LockerConfig, StorageBackend};
pub use error::LockerError;
pub use file::{FileHandle, PathFile, SelectedFile};
pub use types::*;
