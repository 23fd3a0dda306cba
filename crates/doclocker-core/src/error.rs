// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Doclocker.

use thiserror::Error;

/// Top-level error type for all Doclocker operations.
#[derive(Debug, Error)]
pub enum LockerError {
    // -- Identity errors --
    #[error("invalid email or password")]
    Authentication,

    #[error("an account already exists for {email}")]
    Conflict { email: String },

    #[error("no identity is signed in")]
    NotAuthenticated,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    // -- Document errors --
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    // -- Storage / persistence --
    #[error("blob store error: {0}")]
    Persistence(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LockerError>;
