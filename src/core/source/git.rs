//! Git repository source.
//!
//! Reads blobs straight from the object database via `git2`; the working
//! tree is never consulted. Labels are branch names, tag names, or anything
//! `git rev-parse` accepts that peels to a commit.

use std::path::{Path, PathBuf};

use git2::{BranchType, ErrorCode, ObjectType, Oid, Repository};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{clean_path, Revision, VersionedSource};
use crate::error::{Result, SourceError};

/// A local git repository (bare or not).
pub struct GitSource {
    path: PathBuf,
    default_label: Option<String>,
    repo: Mutex<Repository>,
}

impl GitSource {
    /// Open the repository at `path`.
    ///
    /// `default_label` overrides the branch HEAD points at.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` if the repository cannot be opened.
    pub fn open(path: impl AsRef<Path>, default_label: Option<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::open(&path).map_err(unavailable)?;
        debug!(path = %path.display(), bare = repo.is_bare(), "opened git source");
        Ok(Self {
            path,
            default_label,
            repo: Mutex::new(repo),
        })
    }

    fn peel(repo: &Repository, spec: &str) -> Result<Option<Oid>> {
        let object = match repo.revparse_single(spec) {
            Ok(object) => object,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(unavailable(e)),
        };
        match object.peel_to_commit() {
            Ok(commit) => Ok(Some(commit.id())),
            Err(e) if is_missing(&e) || e.code() == ErrorCode::Peel => Ok(None),
            Err(e) => Err(unavailable(e)),
        }
    }
}

impl VersionedSource for GitSource {
    fn list_revisions(&self) -> Result<Vec<Revision>> {
        let repo = self.repo.lock();
        let mut revisions = Vec::new();

        for branch in repo.branches(Some(BranchType::Local)).map_err(unavailable)? {
            let (branch, _) = branch.map_err(unavailable)?;
            let name = branch.name().map_err(unavailable)?.map(str::to_string);
            let target = branch.get().peel_to_commit().map(|c| c.id());
            if let (Some(name), Ok(id)) = (name, target) {
                revisions.push(Revision::new(name, id.to_string()));
            }
        }

        let tags = repo.tag_names(None).map_err(unavailable)?;
        for tag in tags.iter().flatten() {
            if let Some(id) = Self::peel(&repo, &format!("refs/tags/{}", tag))? {
                revisions.push(Revision::new(tag, id.to_string()));
            }
        }

        trace!(count = revisions.len(), "listed revisions");
        Ok(revisions)
    }

    fn default_revision(&self) -> Result<Revision> {
        if let Some(label) = &self.default_label {
            return self
                .resolve_label(label)?
                .ok_or_else(|| SourceError::RevisionNotFound(label.clone()).into());
        }

        let repo = self.repo.lock();
        let head = repo.head().map_err(|e| {
            if is_missing(&e) || e.code() == ErrorCode::UnbornBranch {
                SourceError::RevisionNotFound("HEAD".to_string()).into()
            } else {
                unavailable(e)
            }
        })?;
        let name = head.shorthand().unwrap_or("HEAD").to_string();
        let id = head.peel_to_commit().map_err(unavailable)?.id();
        Ok(Revision::new(name, id.to_string()))
    }

    fn resolve_label(&self, label: &str) -> Result<Option<Revision>> {
        let repo = self.repo.lock();
        let id = Self::peel(&repo, label)?;
        Ok(id.map(|id| Revision::new(label, id.to_string())))
    }

    fn read_blob(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = clean_path(path) else {
            return Ok(None);
        };
        let repo = self.repo.lock();
        let oid = Oid::from_str(revision)
            .map_err(|_| SourceError::RevisionNotFound(revision.to_string()))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|_| SourceError::RevisionNotFound(revision.to_string()))?;
        let tree = commit.tree().map_err(unavailable)?;

        let entry = match tree.get_path(Path::new(&path)) {
            Ok(entry) => entry,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(unavailable(e)),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }

        let object = entry.to_object(&repo).map_err(unavailable)?;
        let blob = object.peel_to_blob().map_err(unavailable)?;
        Ok(Some(blob.content().to_vec()))
    }

    fn exists(&self, revision: &str, path: &str) -> Result<bool> {
        let Some(path) = clean_path(path) else {
            return Ok(false);
        };
        let repo = self.repo.lock();
        let oid = Oid::from_str(revision)
            .map_err(|_| SourceError::RevisionNotFound(revision.to_string()))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|_| SourceError::RevisionNotFound(revision.to_string()))?;
        let tree = commit.tree().map_err(unavailable)?;

        match tree.get_path(Path::new(&path)) {
            Ok(entry) => Ok(entry.kind() == Some(ObjectType::Blob)),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(unavailable(e)),
        }
    }

    fn refresh(&self) -> Result<()> {
        let reopened = Repository::open(&self.path).map_err(unavailable)?;
        *self.repo.lock() = reopened;
        debug!(path = %self.path.display(), "reopened git source");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("git:{}", self.path.display())
    }
}

fn is_missing(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
}

fn unavailable(e: git2::Error) -> crate::error::Error {
    SourceError::Unavailable(e.message().to_string()).into()
}
