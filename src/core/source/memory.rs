//! In-memory source.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use super::{clean_path, Revision, VersionedSource};
use crate::error::{Result, SourceError};

/// Revisions held in memory.
///
/// Each named revision has a stable id derived from its name; content under
/// that id can be replaced, the way a working tree changes in place.
pub struct MemorySource {
    default: String,
    revisions: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    latency: RwLock<Option<Duration>>,
    lookups: AtomicUsize,
}

impl MemorySource {
    /// Empty source whose default revision is `default`.
    pub fn new(default: impl Into<String>) -> Self {
        let default = default.into();
        let mut revisions = BTreeMap::new();
        revisions.insert(default.clone(), BTreeMap::new());
        Self {
            default,
            revisions: RwLock::new(revisions),
            latency: RwLock::new(None),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Store a document under a named revision, creating the revision.
    pub fn put(&self, revision: &str, path: &str, content: impl Into<Vec<u8>>) {
        let path = clean_path(path).unwrap_or_else(|| path.to_string());
        self.revisions
            .write()
            .entry(revision.to_string())
            .or_default()
            .insert(path, content.into());
    }

    /// Remove a document from a named revision.
    pub fn remove(&self, revision: &str, path: &str) {
        if let Some(tree) = self.revisions.write().get_mut(revision) {
            tree.remove(path);
        }
    }

    /// Delay every blob access, to simulate a slow backend.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Number of blob lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn id_of(name: &str) -> String {
        let digest = format!("{:x}", Sha256::digest(name.as_bytes()));
        digest[..12].to_string()
    }

    fn lookup(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read();
        if let Some(delay) = latency {
            std::thread::sleep(delay);
        }

        let Some(path) = clean_path(path) else {
            return Ok(None);
        };
        let revisions = self.revisions.read();
        let tree = revisions
            .iter()
            .find(|(name, _)| Self::id_of(name) == revision)
            .map(|(_, tree)| tree)
            .ok_or_else(|| SourceError::RevisionNotFound(revision.to_string()))?;
        Ok(tree.get(&path).cloned())
    }
}

impl VersionedSource for MemorySource {
    fn list_revisions(&self) -> Result<Vec<Revision>> {
        Ok(self
            .revisions
            .read()
            .keys()
            .map(|name| Revision::new(name.clone(), Self::id_of(name)))
            .collect())
    }

    fn default_revision(&self) -> Result<Revision> {
        Ok(Revision::new(self.default.clone(), Self::id_of(&self.default)))
    }

    fn read_blob(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        self.lookup(revision, path)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
