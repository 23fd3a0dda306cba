// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: opens the configured storage, owns the catalog and
// the session, and exposes the operations the locker UI calls.
//
// The document store, session, and access log are each wrapped in
// `Arc<Mutex<>>` so the struct can be cloned into UI callbacks.  Every
// mutate-then-save sequence runs under the document-store lock, which makes
// this process the single writer of the persisted catalog.  Locks are never
// held across each other except documents → blob store, which never calls
// back.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use doclocker_catalog::{
    ContentStore, DirectoryBlobStore, DocumentStore, SqliteBlobStore, intake, query_filter, recent,
};
use doclocker_core::blob::{BlobStore, MemoryBlobStore};
use doclocker_core::config::{LockerConfig, StorageBackend};
use doclocker_core::error::{LockerError, Result};
use doclocker_core::file::FileHandle;
use doclocker_core::types::{
    Category, DocumentFilter, DocumentId, DocumentRecord, DocumentStats, Identity,
};
use doclocker_security::access::{AccessAction, AccessEntry, AccessLog};
use doclocker_security::integrity::verify_integrity;
use doclocker_security::passwords::Passwords;
use doclocker_security::session::{IdentityDirectory, Session};
use tracing::{debug, error, info, warn};

use super::data_dir;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| LockerError::Persistence(format!("{what} lock poisoned")))
}

/// Shared locker services.
///
/// All fields are cheaply cloneable (Arc-wrapped) so that the struct can be
/// passed into closures without lifetime issues.
#[derive(Clone)]
pub struct LockerServices {
    session: Arc<Mutex<Session>>,
    documents: Arc<Mutex<DocumentStore>>,
    content: ContentStore,
    access_log: Arc<Mutex<Option<AccessLog>>>,
    config: Arc<Mutex<LockerConfig>>,
    data_dir: Option<PathBuf>,
}

impl LockerServices {
    /// Open the locker in the platform data directory.  Call once at startup.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        Self::open(&dir)
    }

    /// Open the locker in `dir`, using `config.json` there if present.
    pub fn open(dir: &Path) -> Result<Self> {
        let config = load_config(dir).unwrap_or_default();
        Self::open_with_config(dir, config)
    }

    /// Open the locker in `dir` with an explicit configuration.
    pub fn open_with_config(dir: &Path, config: LockerConfig) -> Result<Self> {
        info!(path = %dir.display(), backend = ?config.storage_backend, "opening locker");

        let blobs: Arc<dyn BlobStore> = match config.storage_backend {
            StorageBackend::Memory => Arc::new(MemoryBlobStore::new()),
            StorageBackend::Directory => {
                Arc::new(DirectoryBlobStore::open(data_dir::data_subdir(dir, "blobs")?)?)
            }
            StorageBackend::Sqlite => Arc::new(SqliteBlobStore::open(dir.join("locker.db"))?),
        };

        let access_log = match (config.audit_enabled, config.storage_backend) {
            (false, _) => None,
            (true, StorageBackend::Memory) => Some(AccessLog::open_in_memory()?),
            (true, _) => Some(AccessLog::open(dir.join("access.db"))?),
        };

        let mut services = Self::from_parts(blobs, access_log, Passwords::default(), config)?;
        services.data_dir = Some(dir.to_path_buf());
        Ok(services)
    }

    /// Assemble the services over an already-open blob store.
    pub fn from_parts(
        blobs: Arc<dyn BlobStore>,
        access_log: Option<AccessLog>,
        passwords: Passwords,
        config: LockerConfig,
    ) -> Result<Self> {
        let mut directory = IdentityDirectory::load(Arc::clone(&blobs), passwords);
        if config.seed_demo_identities {
            directory.seed_demo()?;
        }
        let documents = DocumentStore::load(Arc::clone(&blobs));

        info!(
            identities = directory.len(),
            documents = documents.len(),
            "locker services initialised"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(Session::new(directory))),
            documents: Arc::new(Mutex::new(documents)),
            content: ContentStore::new(blobs),
            access_log: Arc::new(Mutex::new(access_log)),
            config: Arc::new(Mutex::new(config)),
            data_dir: None,
        })
    }

    // -- Session -------------------------------------------------------------

    /// Sign in with email and password.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let result = lock(&self.session, "session")?.sign_in(email, password);
        match &result {
            Ok(_) => self.audit(AccessAction::SignIn, email, None, true, None),
            Err(e) => self.audit(AccessAction::SignIn, email, None, false, Some(&e.to_string())),
        }
        result
    }

    /// Register a new identity; it is signed in on success.
    pub fn register(&self, email: &str, password: &str, display_name: &str) -> Result<Identity> {
        let result = lock(&self.session, "session")?.register(email, password, display_name);
        match &result {
            Ok(identity) => self.audit(AccessAction::Register, &identity.email, None, true, None),
            Err(e) => self.audit(AccessAction::Register, email, None, false, Some(&e.to_string())),
        }
        result
    }

    /// Clear the active identity.
    pub fn sign_out(&self) -> Result<()> {
        let signed_out = {
            let mut session = lock(&self.session, "session")?;
            let current = session.current().cloned();
            session.sign_out();
            current
        };
        if let Some(identity) = signed_out {
            self.audit(AccessAction::SignOut, &identity.email, None, true, None);
        }
        Ok(())
    }

    /// The signed-in identity, if any.
    pub fn current_identity(&self) -> Result<Option<Identity>> {
        Ok(lock(&self.session, "session")?.current().cloned())
    }

    fn active_identity(&self) -> Result<Identity> {
        lock(&self.session, "session")?.require_identity().cloned()
    }

    // -- Documents -----------------------------------------------------------

    /// Documents of the signed-in identity that pass `filter`, in upload
    /// order.  Empty when nobody is signed in.
    pub fn list_visible_documents(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRecord>> {
        let Some(identity) = self.current_identity()? else {
            return Ok(Vec::new());
        };
        let documents = lock(&self.documents, "documents")?;
        Ok(query_filter(documents.records(), identity.id, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Store a selected file for the signed-in identity.
    ///
    /// `category` of `None` files the document under `Other`.
    pub fn upload_document(
        &self,
        file: Option<&dyn FileHandle>,
        category: Option<Category>,
    ) -> Result<DocumentRecord> {
        let identity = self.active_identity()?;
        let result = {
            let mut documents = lock(&self.documents, "documents")?;
            intake(file, category, identity.id, &mut documents, &self.content)
        };

        match &result {
            Ok(record) => self.audit(
                AccessAction::Upload,
                &identity.email,
                Some(&record.id().to_string()),
                true,
                Some(record.name()),
            ),
            Err(e) => self.audit(
                AccessAction::Upload,
                &identity.email,
                None,
                false,
                Some(&e.to_string()),
            ),
        }
        result
    }

    /// Upload into the category the current view is filtered to, or `Other`
    /// when it shows every category.
    pub fn upload_into_view(
        &self,
        file: Option<&dyn FileHandle>,
        view: &DocumentFilter,
    ) -> Result<DocumentRecord> {
        self.upload_document(file, Some(view.category.upload_category()))
    }

    /// Delete one of the signed-in identity's documents.
    ///
    /// Ids that are absent or belong to someone else are ignored, so a repeat
    /// call is a no-op.  Content bytes are dropped once no record refers to
    /// them.
    pub fn delete_document(&self, id: DocumentId) -> Result<()> {
        let identity = self.active_identity()?;
        let removed = {
            let mut documents = lock(&self.documents, "documents")?;
            if documents.get(id).is_none_or(|r| r.owner_id() != identity.id) {
                debug!(document_id = %id, "delete ignored: not a visible document");
                return Ok(());
            }

            let removed = documents.remove_and_save(id)?;
            if let Some(record) = &removed
                && !documents.references(record.content_ref())
                && let Err(e) = self.content.remove(record.content_ref())
            {
                warn!(error = %e, content = %record.content_ref(), "failed to remove content");
            }
            removed
        };

        if let Some(record) = removed {
            info!(document_id = %id, "document deleted");
            self.audit(
                AccessAction::Delete,
                &identity.email,
                Some(&id.to_string()),
                true,
                Some(record.name()),
            );
        }
        Ok(())
    }

    /// Fetch a document and its verified bytes.
    pub fn download_document(&self, id: DocumentId) -> Result<(DocumentRecord, Vec<u8>)> {
        let identity = self.active_identity()?;
        let record = lock(&self.documents, "documents")?
            .get(id)
            .filter(|r| r.owner_id() == identity.id)
            .cloned()
            .ok_or_else(|| LockerError::NotFound(format!("document {id}")))?;

        let result = self.content.get(record.content_ref()).and_then(|bytes| {
            verify_integrity(&bytes, record.integrity_token())?;
            Ok(bytes)
        });

        let subject = id.to_string();
        match &result {
            Ok(_) => self.audit(AccessAction::Download, &identity.email, Some(&subject), true, None),
            Err(e) => self.audit(
                AccessAction::Download,
                &identity.email,
                Some(&subject),
                false,
                Some(&e.to_string()),
            ),
        }
        result.map(|bytes| (record, bytes))
    }

    /// Totals for the documents that pass `filter`.
    pub fn dashboard_stats(&self, filter: &DocumentFilter) -> Result<DocumentStats> {
        Ok(DocumentStats::from_records(&self.list_visible_documents(filter)?))
    }

    /// The most recently uploaded documents that pass `filter`, newest first,
    /// up to `recent_activity_limit`.
    pub fn recent_activity(&self, filter: &DocumentFilter) -> Result<Vec<DocumentRecord>> {
        let Some(identity) = self.current_identity()? else {
            return Ok(Vec::new());
        };
        let limit = self.config()?.recent_activity_limit;
        let documents = lock(&self.documents, "documents")?;
        Ok(recent(documents.records(), identity.id, filter, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    // -- Access log ----------------------------------------------------------

    fn audit(
        &self,
        action: AccessAction,
        actor: &str,
        subject: Option<&str>,
        success: bool,
        details: Option<&str>,
    ) {
        if let Ok(guard) = self.access_log.lock()
            && let Some(log) = guard.as_ref()
            && let Err(e) = log.record(action, actor, subject, success, details)
        {
            error!(error = %e, "failed to record access entry");
        }
    }

    /// The signed-in identity's latest access-log entries, newest first.
    pub fn recent_access_entries(&self, limit: u32) -> Result<Vec<AccessEntry>> {
        let identity = self.active_identity()?;
        match lock(&self.access_log, "access log")?.as_ref() {
            Some(log) => log.recent_for_actor(&identity.email, limit),
            None => Ok(Vec::new()),
        }
    }

    /// Access-log entries about one of the signed-in identity's documents,
    /// oldest first.  Entries outlive the document, so a deleted id still has
    /// a history; ids the identity never acted on have none.
    pub fn document_history(&self, id: DocumentId) -> Result<Vec<AccessEntry>> {
        let identity = self.active_identity()?;
        let entries = match lock(&self.access_log, "access log")?.as_ref() {
            Some(log) => log.entries_for_subject(&id.to_string())?,
            None => Vec::new(),
        };
        Ok(entries
            .into_iter()
            .filter(|e| e.actor == identity.email)
            .collect())
    }

    // -- Config persistence --------------------------------------------------

    /// A copy of the current config.
    pub fn config(&self) -> Result<LockerConfig> {
        Ok(lock(&self.config, "config")?.clone())
    }

    /// Update and persist the config.  A new storage backend takes effect the
    /// next time the locker is opened.
    pub fn save_config(&self, config: &LockerConfig) -> Result<()> {
        *lock(&self.config, "config")? = config.clone();
        match &self.data_dir {
            Some(dir) => persist_config(dir, config),
            None => Ok(()),
        }
    }

    /// The data directory, when the locker was opened from one.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<LockerConfig> {
    let data = std::fs::read_to_string(data_dir.join(CONFIG_FILE)).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable config file");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &LockerConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}
