//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A key alias inside a keystore.
pub type KeyAlias = String;

/// An immutable revision identifier (commit id for git sources).
pub type RevisionId = String;
