//! Constants used throughout cellar.
//!
//! Centralizes magic strings and configuration values.

/// Default configuration file name.
pub const CONFIG_FILE: &str = "cellar.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CELLAR_CONFIG";

/// Environment variable overriding `encrypt.key`.
pub const ENCRYPT_KEY_ENV: &str = "CELLAR_ENCRYPT_KEY";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CELLAR_LOG";

/// Marker prefixing every encrypted property value.
pub const CIPHER_MARKER: &str = "{cipher}";

/// Prefix applied to keys whose cipher value could not be decrypted.
pub const INVALID_PREFIX: &str = "invalid.";

/// Application name whose documents apply to every application.
pub const SHARED_APPLICATION: &str = "application";

/// Stand-in for `/` inside labels passed through a single path segment.
pub const LABEL_SLASH_ESCAPE: &str = "(_)";

/// Search path used when none is configured (repository root).
pub const DEFAULT_SEARCH_PATHS: &[&str] = &[""];

/// Default bound on a single source access.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Revision name exposed by single-revision sources.
pub const LOCAL_REVISION: &str = "local";
