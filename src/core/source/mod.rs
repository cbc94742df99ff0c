//! Versioned configuration sources.
//!
//! The engine reads configuration through a read-only view of revisions
//! and blobs. It never writes, fetches, or merges.
//!
//! ## Implementations
//!
//! - [`GitSource`]: a local git repository (branches, tags, commits)
//! - [`DirectorySource`]: a plain directory exposed as a single revision
//! - [`MemorySource`]: in-process revisions, for tests and embedding

use crate::core::types::RevisionId;
use crate::error::Result;

mod dir;
mod git;
mod memory;

pub use dir::DirectorySource;
pub use git::GitSource;
pub use memory::MemorySource;

/// A named pointer to an immutable revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Branch, tag, or other label.
    pub name: String,
    /// Immutable id the name currently points at.
    pub id: RevisionId,
}

impl Revision {
    pub fn new(name: impl Into<String>, id: impl Into<RevisionId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Read-only access to a versioned tree of configuration documents.
///
/// Implementations map their own I/O failures to `SourceError::Unavailable`.
pub trait VersionedSource: Send + Sync {
    /// All named revisions.
    fn list_revisions(&self) -> Result<Vec<Revision>>;

    /// The revision used when a request carries no label.
    fn default_revision(&self) -> Result<Revision>;

    /// Resolve a label to a revision, `None` if it does not exist.
    ///
    /// Matches revision names, then ids.
    fn resolve_label(&self, label: &str) -> Result<Option<Revision>> {
        let revisions = self.list_revisions()?;
        let found = revisions
            .iter()
            .find(|r| r.name == label)
            .or_else(|| revisions.iter().find(|r| r.id == label))
            .cloned();
        Ok(found)
    }

    /// Read a blob at a revision, `None` if the path does not exist.
    fn read_blob(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>>;

    /// Whether a blob exists at a revision.
    fn exists(&self, revision: &str, path: &str) -> Result<bool> {
        Ok(self.read_blob(revision, path)?.is_some())
    }

    /// Pick up upstream changes. Called by `ConfigServer::refresh`.
    fn refresh(&self) -> Result<()> {
        Ok(())
    }

    /// Short description used in property source names (e.g. `git:/srv/config`).
    fn describe(&self) -> String;
}

/// Normalize a repository-relative path, rejecting escapes.
pub(crate) fn clean_path(path: &str) -> Option<String> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
