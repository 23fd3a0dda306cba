// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session and identity context.
//
// The `IdentityDirectory` owns every known identity (with its password hash)
// and persists them through the blob store.  A `Session` wraps the directory
// and tracks which identity, if any, is currently acting.  Document queries
// are scoped by `Session::require_identity`, so a signed-out session can
// never see another identity's documents.

use std::sync::Arc;

use doclocker_core::blob::BlobStore;
use doclocker_core::error::{LockerError, Result};
use doclocker_core::types::{Identity, IdentityId};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::integrity::quarantine_blob;
use crate::passwords::Passwords;

/// Blob-store key holding the serialized identity directory.
pub const IDENTITIES_KEY: &str = "digilocker-identities";

/// Demo accounts created when `seed_demo_identities` is enabled.
pub const DEMO_IDENTITIES: [(&str, &str, &str); 2] = [
    ("user@example.com", "password123", "Demo User"),
    ("admin@example.com", "admin123", "Admin User"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredIdentity {
    id: IdentityId,
    email: String,
    display_name: String,
    password_hash: String,
}

impl StoredIdentity {
    fn public(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Every identity known to this locker.
pub struct IdentityDirectory {
    identities: Vec<StoredIdentity>,
    store: Arc<dyn BlobStore>,
    passwords: Passwords,
}

impl IdentityDirectory {
    /// Load the directory from `store`.
    ///
    /// A missing or unreadable blob yields an empty directory; the failure is
    /// logged rather than returned.  An undecodable blob is first copied aside
    /// with [`quarantine_blob`] so registering into the empty directory does
    /// not destroy the accounts it held.
    #[instrument(skip_all)]
    pub fn load(store: Arc<dyn BlobStore>, passwords: Passwords) -> Self {
        let identities = match store.get(IDENTITIES_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<StoredIdentity>>(&bytes) {
                Ok(identities) => identities,
                Err(e) => {
                    match quarantine_blob(store.as_ref(), IDENTITIES_KEY, &bytes) {
                        Ok(copy) => warn!(
                            error = %e,
                            quarantine = %copy,
                            "identity directory is corrupt; starting empty"
                        ),
                        Err(qe) => error!(
                            error = %e,
                            quarantine_error = %qe,
                            "identity directory is corrupt and could not be copied aside"
                        ),
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "identity directory unreadable; starting empty");
                Vec::new()
            }
        };

        debug!(count = identities.len(), "identity directory loaded");
        Self {
            identities,
            store,
            passwords,
        }
    }

    fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.identities)?;
        self.store.set(IDENTITIES_KEY, &bytes)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Look up an identity by email, ignoring surrounding whitespace.
    pub fn find_by_email(&self, email: &str) -> Option<Identity> {
        let email = email.trim();
        self.identities
            .iter()
            .find(|i| i.email == email)
            .map(StoredIdentity::public)
    }

    /// Check credentials.  Unknown email and wrong password both fail with
    /// `LockerError::Authentication`.  The email is trimmed as at
    /// registration.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Identity> {
        let email = email.trim();
        let stored = self
            .identities
            .iter()
            .find(|i| i.email == email)
            .ok_or(LockerError::Authentication)?;

        if self.passwords.verify(password, &stored.password_hash)? {
            Ok(stored.public())
        } else {
            Err(LockerError::Authentication)
        }
    }

    /// Add a new identity and persist the directory.
    ///
    /// The in-memory directory is left unchanged if the save fails.
    pub fn create(&mut self, email: &str, password: &str, display_name: &str) -> Result<Identity> {
        let email = email.trim();
        let display_name = display_name.trim();
        if email.is_empty() {
            return Err(LockerError::Validation("email address is required".into()));
        }
        if password.is_empty() {
            return Err(LockerError::Validation("password is required".into()));
        }
        if display_name.is_empty() {
            return Err(LockerError::Validation("display name is required".into()));
        }
        if self.identities.iter().any(|i| i.email == email) {
            return Err(LockerError::Conflict {
                email: email.to_owned(),
            });
        }

        let stored = StoredIdentity {
            id: IdentityId::new(),
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            password_hash: self.passwords.hash(password)?,
        };
        let identity = stored.public();
        self.identities.push(stored);

        if let Err(e) = self.save() {
            self.identities.pop();
            return Err(e);
        }

        info!(identity_id = %identity.id, "identity registered");
        Ok(identity)
    }

    /// Create the demo identities that do not exist yet.
    pub fn seed_demo(&mut self) -> Result<()> {
        for (email, password, name) in DEMO_IDENTITIES {
            if self.find_by_email(email).is_none() {
                self.create(email, password, name)?;
            }
        }
        Ok(())
    }
}

/// Who is currently acting.
pub struct Session {
    directory: IdentityDirectory,
    active: Option<Identity>,
}

impl Session {
    /// A signed-out session over `directory`.
    pub fn new(directory: IdentityDirectory) -> Self {
        Self {
            directory,
            active: None,
        }
    }

    /// Authenticate and make the identity active.
    ///
    /// A failed attempt also clears any previously active identity.
    #[instrument(skip(self, password))]
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<Identity> {
        self.active = None;
        let identity = self.directory.authenticate(email, password)?;
        info!(identity_id = %identity.id, "signed in");
        self.active = Some(identity.clone());
        Ok(identity)
    }

    /// Register a new identity and sign it in immediately.
    #[instrument(skip(self, password))]
    pub fn register(&mut self, email: &str, password: &str, display_name: &str) -> Result<Identity> {
        let identity = self.directory.create(email, password, display_name)?;
        self.active = Some(identity.clone());
        Ok(identity)
    }

    /// Clear the active identity.
    pub fn sign_out(&mut self) {
        if let Some(identity) = self.active.take() {
            info!(identity_id = %identity.id, "signed out");
        }
    }

    pub fn current(&self) -> Option<&Identity> {
        self.active.as_ref()
    }

    /// The active identity, or `LockerError::NotAuthenticated`.
    pub fn require_identity(&self) -> Result<&Identity> {
        self.active.as_ref().ok_or(LockerError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use doclocker_core::blob::MemoryBlobStore;

    use super::*;
    use crate::integrity::quarantine_key;

    fn passwords() -> Passwords {
        Passwords::with_params(1024, 1, 1).expect("valid argon2 params")
    }

    fn session_over(store: Arc<dyn BlobStore>) -> Session {
        Session::new(IdentityDirectory::load(store, passwords()))
    }

    fn session() -> Session {
        session_over(Arc::new(MemoryBlobStore::new()))
    }

    #[test]
    fn register_signs_in() {
        let mut s = session();
        let id = s.register("a@x.com", "p", "Name").unwrap();
        assert_eq!(s.current(), Some(&id));
        assert_eq!(id.display_name, "Name");
    }

    #[test]
    fn duplicate_email_conflicts() {
        let mut s = session();
        s.register("a@x.com", "p", "Name").unwrap();
        let err = s.register("a@x.com", "p2", "Name2").unwrap_err();
        assert!(matches!(err, LockerError::Conflict { ref email } if email == "a@x.com"));
        assert_eq!(s.directory.len(), 1);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut s = session();
        assert!(matches!(s.register("  ", "p", "N"), Err(LockerError::Validation(_))));
        assert!(matches!(s.register("a@x.com", "", "N"), Err(LockerError::Validation(_))));
        assert!(matches!(s.register("a@x.com", "p", " "), Err(LockerError::Validation(_))));
        assert!(s.directory.is_empty());
    }

    #[test]
    fn sign_in_checks_password() {
        let mut s = session();
        let registered = s.register("a@x.com", "secret", "A").unwrap();
        s.sign_out();

        assert!(matches!(s.sign_in("a@x.com", "wrong"), Err(LockerError::Authentication)));
        assert!(matches!(s.sign_in("b@x.com", "secret"), Err(LockerError::Authentication)));
        assert!(s.current().is_none());

        let signed_in = s.sign_in("a@x.com", "secret").unwrap();
        assert_eq!(signed_in.id, registered.id);
    }

    #[test]
    fn failed_sign_in_clears_previous_identity() {
        let mut s = session();
        s.register("a@x.com", "secret", "A").unwrap();
        assert!(s.sign_in("a@x.com", "nope").is_err());
        assert!(matches!(s.require_identity(), Err(LockerError::NotAuthenticated)));
    }

    #[test]
    fn sign_out_fails_closed() {
        let mut s = session();
        s.register("a@x.com", "p", "A").unwrap();
        s.sign_out();
        assert!(s.current().is_none());
        assert!(matches!(s.require_identity(), Err(LockerError::NotAuthenticated)));
    }

    #[test]
    fn directory_survives_reload_without_plaintext() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let mut s = session_over(Arc::clone(&store));
        let id = s.register("a@x.com", "hunter22", "A").unwrap();

        let raw = store.get(IDENTITIES_KEY).unwrap().unwrap();
        assert!(!String::from_utf8_lossy(&raw).contains("hunter22"));

        let mut reloaded = session_over(store);
        assert_eq!(reloaded.sign_in("a@x.com", "hunter22").unwrap().id, id.id);
    }

    #[test]
    fn corrupt_directory_loads_empty() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        store.set(IDENTITIES_KEY, b"{not json").unwrap();
        let s = session_over(store);
        assert!(s.directory.is_empty());
    }

    #[test]
    fn registering_after_corruption_keeps_the_old_accounts() {
        let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        let mut s = session_over(Arc::clone(&store));
        s.register("a@x.com", "p", "A").unwrap();
        s.register("b@x.com", "p", "B").unwrap();

        let mut damaged = store.get(IDENTITIES_KEY).unwrap().unwrap();
        let last = damaged.len() - 1;
        damaged[last] = b' ';
        store.set(IDENTITIES_KEY, &damaged).unwrap();

        let mut s = session_over(Arc::clone(&store));
        assert!(s.directory.is_empty());
        s.register("c@x.com", "p", "C").unwrap();

        let copy = store
            .get(&quarantine_key(IDENTITIES_KEY, &damaged))
            .unwrap()
            .expect("damaged directory copied aside");
        assert_eq!(copy, damaged);
        assert!(String::from_utf8_lossy(&copy).contains("b@x.com"));
    }

    #[test]
    fn sign_in_trims_email_like_registration() {
        let mut s = session();
        let registered = s.register(" a@x.com ", "p", "A").unwrap();
        assert_eq!(registered.email, "a@x.com");
        s.sign_out();

        assert_eq!(s.sign_in(" a@x.com ", "p").unwrap().id, registered.id);
        assert_eq!(s.sign_in("a@x.com", "p").unwrap().id, registered.id);
    }

    #[test]
    fn demo_seeding_is_idempotent() {
        let mut s = session();
        s.directory.seed_demo().unwrap();
        s.directory.seed_demo().unwrap();
        assert_eq!(s.directory.len(), DEMO_IDENTITIES.len());
        assert!(s.sign_in("user@example.com", "password123").is_ok());
    }
}
