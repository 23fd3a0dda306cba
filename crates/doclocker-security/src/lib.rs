// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! doclocker-security: identity and integrity primitives for the locker.
//!
//! Provides SHA-256 integrity tokens for stored content, Argon2id password
//! hashing, the session/identity context that scopes every document query,
//! and an append-only access log.

pub mod access;
pub mod integrity;
pub mod passwords;
pub mod session;

pub use access::{AccessAction, AccessEntry, AccessLog};
pub use integrity::{content_ref_for, integrity_token, quarantine_blob, verify_integrity};
pub use passwords::Passwords;
pub use session::{IdentityDirectory, Session};
