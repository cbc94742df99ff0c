//! Repository resolution.
//!
//! Turns an application/profile/label request into the ordered list of
//! documents that apply at one revision. Candidate base names, most specific
//! first:
//!
//! ```text
//! {application}-{profile}   {application}   application-{profile}   application
//! ```
//!
//! With several profiles the later profile wins within each group. Each base
//! name is tried under every search path and with every supported extension,
//! nested encodings first.
//!
//! Only existence lookups are cached, keyed by revision id. Document content
//! is always read fresh.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::core::constants;
use crate::core::document::Encoding;
use crate::core::domain::ResolutionRequest;
use crate::core::source::{Revision, VersionedSource};
use crate::core::types::RevisionId;
use crate::error::{Result, SourceError};

/// Resolver settings taken from the `[source]` config section.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Directories searched for documents; may contain `{application}`,
    /// `{profile}` and `{label}` placeholders.
    pub search_paths: Vec<String>,
    /// Bound on each access to the source.
    pub timeout: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            search_paths: constants::DEFAULT_SEARCH_PATHS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Where a document lives within a revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocation {
    pub path: String,
    pub encoding: Encoding,
}

/// Outcome of resolving a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub revision: Revision,
    /// Documents in override order, highest priority first.
    pub documents: Vec<DocumentLocation>,
}

/// Selects the documents that apply to a request.
pub struct RepositoryResolver {
    source: Arc<dyn VersionedSource>,
    options: ResolverOptions,
    existence: RwLock<HashMap<(RevisionId, String), bool>>,
}

impl RepositoryResolver {
    pub fn new(source: Arc<dyn VersionedSource>, options: ResolverOptions) -> Self {
        Self {
            source,
            options,
            existence: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the revision and the applicable documents for a request.
    ///
    /// # Errors
    ///
    /// - `SourceError::RevisionNotFound` if the label does not exist
    /// - `SourceError::Unavailable` on I/O failure or timeout
    /// - `SourceError::EmptySourceSet` if no document matched (carries no
    ///   revision; use [`resolve_revision`](Self::resolve_revision) first to
    ///   learn it)
    pub fn resolve(&self, request: &ResolutionRequest) -> Result<Resolution> {
        let revision = self.resolve_revision(request.label())?;
        let documents = self.documents_at(&revision, request)?;
        if documents.is_empty() {
            return Err(SourceError::EmptySourceSet.into());
        }
        Ok(Resolution {
            revision,
            documents,
        })
    }

    /// Resolve a label (or the default) to a revision.
    pub fn resolve_revision(&self, label: Option<&str>) -> Result<Revision> {
        let label = label.map(str::to_string);
        let revision = self.bounded("resolve revision", move |source| match label {
            Some(label) => source
                .resolve_label(&label)?
                .ok_or_else(|| SourceError::RevisionNotFound(label).into()),
            None => source.default_revision(),
        })?;
        debug!(label = %revision.name, revision = %revision.id, "resolved revision");
        Ok(revision)
    }

    /// Documents that exist at `revision` for a request, in override order.
    pub fn documents_at(
        &self,
        revision: &Revision,
        request: &ResolutionRequest,
    ) -> Result<Vec<DocumentLocation>> {
        let candidates = self.candidates(request, &revision.name);

        let unknown: Vec<String> = {
            let cache = self.existence.read();
            candidates
                .iter()
                .filter(|c| !cache.contains_key(&(revision.id.clone(), c.path.clone())))
                .map(|c| c.path.clone())
                .collect()
        };

        if !unknown.is_empty() {
            trace!(count = unknown.len(), revision = %revision.id, "checking candidates");
            let id = revision.id.clone();
            let found = self.bounded("check documents", move |source| {
                unknown
                    .into_iter()
                    .map(|path| source.exists(&id, &path).map(|hit| (path, hit)))
                    .collect::<Result<Vec<_>>>()
            })?;

            let mut cache = self.existence.write();
            for (path, hit) in found {
                cache.insert((revision.id.clone(), path), hit);
            }
        }

        let cache = self.existence.read();
        let documents: Vec<DocumentLocation> = candidates
            .into_iter()
            .filter(|c| {
                cache
                    .get(&(revision.id.clone(), c.path.clone()))
                    .copied()
                    .unwrap_or(false)
            })
            .collect();

        debug!(
            application = request.application(),
            profile = request.profile(),
            documents = documents.len(),
            "resolved documents"
        );
        Ok(documents)
    }

    /// Read one resolved document.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` on I/O failure, timeout, or if the
    /// document vanished since it was resolved.
    pub fn read(&self, revision: &Revision, location: &DocumentLocation) -> Result<Vec<u8>> {
        let id = revision.id.clone();
        let path = location.path.clone();
        self.bounded("read document", move |source| {
            source.read_blob(&id, &path)?.ok_or_else(|| {
                SourceError::Unavailable(format!("document disappeared: {}", path)).into()
            })
        })
    }

    /// All candidate locations for a request, in override order.
    pub fn candidates(&self, request: &ResolutionRequest, label: &str) -> Vec<DocumentLocation> {
        let search_paths: Vec<String> = self
            .options
            .search_paths
            .iter()
            .map(|p| expand_search_path(p, request, label))
            .collect();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for base in base_names(request) {
            for dir in &search_paths {
                for (encoding, ext) in Encoding::LOOKUP_ORDER {
                    let path = if dir.is_empty() {
                        format!("{}.{}", base, ext)
                    } else {
                        format!("{}/{}.{}", dir, base, ext)
                    };
                    if seen.insert(path.clone()) {
                        out.push(DocumentLocation {
                            path,
                            encoding: *encoding,
                        });
                    }
                }
            }
        }
        out
    }

    /// Forget every cached existence lookup.
    pub fn invalidate(&self) {
        let mut cache = self.existence.write();
        debug!(entries = cache.len(), "invalidating existence cache");
        cache.clear();
    }

    /// Invalidate the cache and let the source pick up upstream changes.
    pub fn refresh(&self) -> Result<()> {
        self.invalidate();
        self.bounded("refresh source", |source| source.refresh())
    }

    /// Named revisions of the source.
    pub fn revisions(&self) -> Result<Vec<Revision>> {
        self.bounded("list revisions", |source| source.list_revisions())
    }

    pub fn source(&self) -> &Arc<dyn VersionedSource> {
        &self.source
    }

    /// Run a source operation on a helper thread, bounded by the timeout.
    ///
    /// On timeout the helper is left to finish on its own.
    fn bounded<T, F>(&self, what: &'static str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn VersionedSource) -> Result<T> + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        let (tx, rx) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name("cellar-source".to_string())
            .spawn(move || {
                let _ = tx.send(op(source.as_ref()));
            })
            .map_err(|e| SourceError::Unavailable(format!("{}: {}", what, e)))?;

        match rx.recv_timeout(self.options.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(SourceError::Unavailable(format!(
                "{} timed out after {:?}",
                what, self.options.timeout
            ))
            .into()),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(SourceError::Unavailable(format!("{}: source worker failed", what)).into())
            }
        }
    }
}

/// Base names in override order.
fn base_names(request: &ResolutionRequest) -> Vec<String> {
    let app = request.application();
    let profiles: Vec<&str> = request.profiles().into_iter().rev().collect();

    let mut names = Vec::new();
    for group in [app, constants::SHARED_APPLICATION] {
        for profile in &profiles {
            names.push(format!("{}-{}", group, profile));
        }
        names.push(group.to_string());
    }
    let mut seen = HashSet::new();
    names.retain(|n| seen.insert(n.clone()));
    names
}

fn expand_search_path(pattern: &str, request: &ResolutionRequest, label: &str) -> String {
    let expanded = pattern
        .replace("{application}", request.application())
        .replace("{profile}", request.profile())
        .replace("{label}", label);
    expanded.trim_matches('/').to_string()
}
