//! Plain directory source.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{clean_path, Revision, VersionedSource};
use crate::core::constants::LOCAL_REVISION;
use crate::error::{Result, SourceError};

/// A directory of documents exposed as one revision named `local`.
///
/// There is no history: any other label is not found, and changes on disk
/// become visible to existence checks only after a refresh.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` if `root` is not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(SourceError::Unavailable(format!(
                "not a directory: {}",
                root.display()
            ))
            .into());
        }
        debug!(root = %root.display(), "opened directory source");
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn full_path(&self, revision: &str, path: &str) -> Result<Option<PathBuf>> {
        if revision != LOCAL_REVISION {
            return Err(SourceError::RevisionNotFound(revision.to_string()).into());
        }
        Ok(clean_path(path).map(|p| self.root.join(p)))
    }
}

impl VersionedSource for DirectorySource {
    fn list_revisions(&self) -> Result<Vec<Revision>> {
        Ok(vec![Revision::new(LOCAL_REVISION, LOCAL_REVISION)])
    }

    fn default_revision(&self) -> Result<Revision> {
        Ok(Revision::new(LOCAL_REVISION, LOCAL_REVISION))
    }

    fn read_blob(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let Some(full) = self.full_path(revision, path)? else {
            return Ok(None);
        };
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if full.is_dir() => {
                debug!(path = %full.display(), error = %e, "skipping directory");
                Ok(None)
            }
            Err(e) => Err(SourceError::Unavailable(format!("{}: {}", full.display(), e)).into()),
        }
    }

    fn exists(&self, revision: &str, path: &str) -> Result<bool> {
        Ok(self
            .full_path(revision, path)?
            .map(|p| p.is_file())
            .unwrap_or(false))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }
}
