// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Password hashing: Argon2id with PHC-encoded output.
//
// Each hash embeds its own salt and cost parameters, so verification keeps
// working after the hashing parameters change.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use doclocker_core::error::{LockerError, Result};
use tracing::instrument;

fn hash_err(e: password_hash::Error) -> LockerError {
    LockerError::PasswordHash(e.to_string())
}

/// Argon2id hasher for identity passwords.
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
}

impl Default for Passwords {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Passwords {
    /// Hasher with explicit cost parameters (memory KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| LockerError::PasswordHash(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `password` with a fresh random salt.
    #[instrument(skip_all)]
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(hash_err)?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored PHC string.
    ///
    /// A wrong password is `Ok(false)`; a malformed stored hash is an error.
    #[instrument(skip_all)]
    pub fn verify(&self, password: &str, phc: &str) -> Result<bool> {
        let parsed = PasswordHash::new(phc).map_err(hash_err)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(hash_err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passwords() -> Passwords {
        Passwords::with_params(1024, 1, 1).expect("valid argon2 params")
    }

    #[test]
    fn hash_then_verify() {
        let pw = passwords();
        let phc = pw.hash("password123").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(pw.verify("password123", &phc).unwrap());
        assert!(!pw.verify("password124", &phc).unwrap());
    }

    #[test]
    fn salts_differ() {
        let pw = passwords();
        assert_ne!(pw.hash("same").unwrap(), pw.hash("same").unwrap());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let phc = passwords().hash("correct-horse").unwrap();
        assert!(!phc.contains("correct-horse"));
    }

    #[test]
    fn malformed_hash_is_error() {
        let result = passwords().verify("x", "not-a-phc-string");
        assert!(matches!(result, Err(LockerError::PasswordHash(_))));
    }
}
