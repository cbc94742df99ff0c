//! Error types.
//!
//! Each concern has its own error enum; [`Error`] wraps them so callers can
//! use a single `Result` alias and still match on the category.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Versioned source and revision resolution errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    #[error("no configuration documents matched")]
    EmptySourceSet,

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Property document parse/serialize errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("malformed document {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("unsupported document encoding: {0}")]
    UnsupportedEncoding(String),
}

/// Key material lookup and storage errors.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("no default encryption key configured")]
    NoDefaultKeyConfigured,

    #[error("unknown key alias: {0}")]
    UnknownKeyAlias(String),

    #[error("key alias already exists: {0}")]
    AliasExists(String),

    #[error("invalid key format: {0}")]
    InvalidFormat(String),

    #[error("failed to read keystore: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write keystore: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Encryption and decryption errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("malformed cipher value: {0}")]
    MalformedValue(String),
}

/// Startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing config field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Error {
    /// Stable machine-readable code for this error.
    ///
    /// Cryptography callers rely on these to tell a missing key apart from
    /// a bad ciphertext.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Source(SourceError::RevisionNotFound(_)) => "REVISION_NOT_FOUND",
            Error::Source(SourceError::EmptySourceSet) => "EMPTY_SOURCE_SET",
            Error::Source(SourceError::Unavailable(_)) => "SOURCE_UNAVAILABLE",
            Error::Document(_) => "MALFORMED_DOCUMENT",
            Error::Key(KeyError::NoDefaultKeyConfigured) => "NO_KEY",
            Error::Key(KeyError::UnknownKeyAlias(_)) => "UNKNOWN_KEY_ALIAS",
            Error::Key(_) => "KEY_ERROR",
            Error::Cipher(CipherError::EncryptionFailed(_)) => "ENCRYPTION_FAILED",
            Error::Cipher(_) => "DECRYPTION_FAILED",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) | Error::Json(_) => "INTERNAL",
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.code() {
            "REVISION_NOT_FOUND" => 3,
            "SOURCE_UNAVAILABLE" => 4,
            "MALFORMED_DOCUMENT" => 5,
            "NO_KEY" => 6,
            "UNKNOWN_KEY_ALIAS" => 7,
            "DECRYPTION_FAILED" => 8,
            "CONFIG_ERROR" => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
