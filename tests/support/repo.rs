//! Throwaway git repositories.

use std::path::Path;

use git2::{Repository, Signature};

/// Initialize a repository at `path`.
pub fn init(path: &Path) -> Repository {
    Repository::init(path).expect("failed to init repository")
}

/// Write and commit `files` on the current branch, returning the commit id.
pub fn commit(path: &Path, files: &[(&str, &str)], message: &str) -> String {
    let repo = Repository::open(path).expect("failed to open repository");
    let mut index = repo.index().expect("failed to open index");

    for (rel, content) in files {
        let full = path.join(rel);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dir");
        }
        std::fs::write(&full, content).expect("failed to write file");
        index.add_path(Path::new(rel)).expect("failed to stage file");
    }
    index.write().expect("failed to write index");

    let tree_id = index.write_tree().expect("failed to write tree");
    let tree = repo.find_tree(tree_id).expect("failed to find tree");
    let sig = Signature::now("cellar-test", "test@example.com").expect("bad signature");

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("failed to commit")
        .to_string()
}

/// Tag a commit.
pub fn tag(path: &Path, name: &str, commit: &str) {
    let repo = Repository::open(path).expect("failed to open repository");
    let oid = git2::Oid::from_str(commit).expect("bad commit id");
    let object = repo.find_object(oid, None).expect("commit not found");
    repo.tag_lightweight(name, &object, false)
        .expect("failed to tag");
}

/// Create a branch at a commit.
pub fn branch(path: &Path, name: &str, commit: &str) {
    let repo = Repository::open(path).expect("failed to open repository");
    let oid = git2::Oid::from_str(commit).expect("bad commit id");
    let commit = repo.find_commit(oid).expect("commit not found");
    repo.branch(name, &commit, false).expect("failed to branch");
}
