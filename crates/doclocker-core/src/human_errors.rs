// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the locker UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Authentication and validation failures must be shown to the user; storage
// failures are phrased so the user knows their documents are not lost.

use crate::error::LockerError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Storage hiccup: trying again may work.
    Transient,
    /// User must do something (fix the form, sign in, pick another file).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same action again can succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: impl Into<String>, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

/// Convert a `LockerError` into a `HumanError` for display.
pub fn humanize_error(err: &LockerError) -> HumanError {
    match err {
        // -- Identity --
        LockerError::Authentication => HumanError::new(
            "Invalid credentials.",
            "Check your email address and password, then try again.",
            false,
            Severity::ActionRequired,
        ),

        LockerError::Conflict { email } => HumanError::new(
            "That email address is already registered.",
            format!("Sign in as {email} instead, or register with a different address."),
            false,
            Severity::ActionRequired,
        ),

        LockerError::NotAuthenticated => HumanError::new(
            "You're signed out.",
            "Please sign in again to see and manage your documents.",
            false,
            Severity::ActionRequired,
        ),

        LockerError::PasswordHash(_) => HumanError::new(
            "We couldn't secure your password.",
            "Try again. If this keeps happening, please report it.",
            true,
            Severity::Transient,
        ),

        // -- Documents --
        LockerError::Validation(detail) => HumanError::new(
            "Something is missing or not quite right.",
            format!("Please check and try again. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        LockerError::NotFound(_) => HumanError::new(
            "That document isn't in your locker.",
            "It may have been deleted. Refresh the list and try again.",
            false,
            Severity::ActionRequired,
        ),

        LockerError::IntegrityMismatch { .. } => HumanError::new(
            "This document has been changed since it was stored.",
            "The stored copy doesn't match its fingerprint. Upload the file again from the original source.",
            false,
            Severity::Permanent,
        ),

        // -- Storage --
        LockerError::Persistence(_) | LockerError::Database(_) => HumanError::new(
            "The locker's storage had a problem.",
            "Try again in a moment. Documents that were already saved are still there.",
            true,
            Severity::Transient,
        ),

        LockerError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "The file couldn't be found.",
                "It may have been moved or deleted. Try choosing the file again.",
                false,
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "The app doesn't have permission to read that file.",
                "Check the file permissions, or copy the file somewhere else first.",
                false,
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "There was a problem reading or writing a file.",
                "Try again. If this keeps happening, your device's storage may be full.",
                true,
                Severity::Transient,
            ),
        },

        LockerError::Serialization(_) => HumanError::new(
            "The app had an internal data problem.",
            "Try again. If this keeps happening, please report it.",
            true,
            Severity::Transient,
        ),
    }
}
