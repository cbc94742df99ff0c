//! Configuration file management.
//!
//! Handles reading and validating `cellar.toml`. Relative paths inside the
//! file resolve against the directory the file lives in.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::constants;
use crate::core::keys::{KeyProvider, Keystore, NoKeys, SymmetricSecret};
use crate::core::resolver::ResolverOptions;
use crate::core::source::{clean_path, DirectorySource, GitSource, VersionedSource};
use crate::error::{ConfigError, Result};

/// Service configuration stored in `cellar.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where configuration documents are read from.
    #[serde(default)]
    pub source: SourceConfig,
    /// Server-side cryptography.
    #[serde(default)]
    pub encrypt: EncryptConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// `[source]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Local git repository.
    #[serde(default)]
    pub git: Option<PathBuf>,
    /// Plain directory, exposed as a single revision.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Label used when a request has none.
    #[serde(default)]
    pub default_label: Option<String>,
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            git: None,
            dir: None,
            default_label: None,
            search_paths: default_search_paths(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[encrypt]` section.
///
/// Neither `key` nor `keystore` disables server-side cryptography.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptConfig {
    /// Decrypt cipher values while assembling environments.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Symmetric secret.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub keystore: Option<KeystoreConfig>,
}

impl Default for EncryptConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            key: None,
            keystore: None,
        }
    }
}

impl fmt::Debug for EncryptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptConfig")
            .field("enabled", &self.enabled)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("keystore", &self.keystore)
            .finish()
    }
}

/// `[encrypt.keystore]` section.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeystoreConfig {
    pub path: PathBuf,
    /// Passphrase the keystore file is sealed with.
    #[serde(default)]
    pub password: Option<String>,
    /// Alias used for values without a `{key:...}` selector.
    #[serde(default)]
    pub default_alias: Option<String>,
}

impl fmt::Debug for KeystoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreConfig")
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("default_alias", &self.default_alias)
            .finish()
    }
}

/// Which provider the configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Disabled,
    Symmetric,
    Keystore,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMode::Disabled => f.write_str("disabled"),
            KeyMode::Symmetric => f.write_str("symmetric"),
            KeyMode::Keystore => f.write_str("keystore"),
        }
    }
}

impl Config {
    /// Config file path: `explicit` if given, else `cellar.toml` in the
    /// current directory.
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(constants::CONFIG_FILE))
    }

    /// Load, apply the `CELLAR_ENCRYPT_KEY` override, and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if the TOML is malformed, or a validation error.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut config = Self::parse(&contents, base_dir)?;
        if let Ok(key) = std::env::var(constants::ENCRYPT_KEY_ENV) {
            config.override_key(key);
        }
        config.validate()?;

        debug!(
            source = config.source_kind(),
            keys = %config.key_mode(),
            "config loaded"
        );
        Ok(config)
    }

    /// Parse TOML without validating; relative paths resolve against `base_dir`.
    pub fn parse(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.base_dir = base_dir.into();
        Ok(config)
    }

    /// Replace the symmetric key (environment override). Empty values are ignored.
    pub fn override_key(&mut self, key: String) {
        if !key.is_empty() {
            debug!(var = constants::ENCRYPT_KEY_ENV, "encrypt.key overridden from environment");
            self.encrypt.key = Some(key);
        }
    }

    /// Validate the configuration structure and contents.
    ///
    /// Checks:
    /// - Exactly one of `source.git` / `source.dir`
    /// - A positive timeout and search paths that stay inside the source
    /// - At most one of `encrypt.key` / `encrypt.keystore`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` or `ConfigError::MissingField` on validation failure.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        match (&self.source.git, &self.source.dir) {
            (None, None) => return Err(ConfigError::MissingField { field: "source.git" }.into()),
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    field: "source",
                    reason: "set either `git` or `dir`, not both".to_string(),
                }
                .into())
            }
            _ => {}
        }

        if self.source.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.timeout_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        for path in &self.source.search_paths {
            if clean_path(path).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "source.search_paths",
                    reason: format!("'{}' escapes the source root", path),
                }
                .into());
            }
        }

        if let Some(label) = &self.source.default_label {
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "source.default_label",
                    reason: "must not be empty".to_string(),
                }
                .into());
            }
        }

        if self.encrypt.key.is_some() && self.encrypt.keystore.is_some() {
            return Err(ConfigError::InvalidValue {
                field: "encrypt",
                reason: "set either `key` or `keystore`, not both".to_string(),
            }
            .into());
        }

        if matches!(&self.encrypt.key, Some(k) if k.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "encrypt.key",
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Open the configured versioned source.
    pub fn open_source(&self) -> Result<Arc<dyn VersionedSource>> {
        if let Some(git) = &self.source.git {
            let source = GitSource::open(self.resolve(git), self.source.default_label.clone())?;
            return Ok(Arc::new(source));
        }
        if let Some(dir) = &self.source.dir {
            return Ok(Arc::new(DirectorySource::open(self.resolve(dir))?));
        }
        Err(ConfigError::MissingField { field: "source.git" }.into())
    }

    /// Build the configured key provider.
    ///
    /// # Errors
    ///
    /// Returns a `KeyError` if the keystore cannot be opened.
    pub fn key_provider(&self) -> Result<Arc<dyn KeyProvider>> {
        if let Some(key) = &self.encrypt.key {
            return Ok(Arc::new(SymmetricSecret::new(key)?));
        }
        if let Some(ks) = &self.encrypt.keystore {
            let store = Keystore::open(
                self.resolve(&ks.path),
                ks.password.as_deref(),
                ks.default_alias.as_deref(),
            )?;
            return Ok(Arc::new(store));
        }
        Ok(Arc::new(NoKeys))
    }

    /// Open the keystore for writing, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if no keystore is configured.
    pub fn open_keystore(&self) -> Result<Keystore> {
        let ks = self.encrypt.keystore.as_ref().ok_or(ConfigError::MissingField {
            field: "encrypt.keystore",
        })?;
        Keystore::open_or_create(
            self.resolve(&ks.path),
            ks.password.as_deref(),
            ks.default_alias.as_deref(),
        )
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            search_paths: self.source.search_paths.clone(),
            timeout: Duration::from_secs(self.source.timeout_secs),
        }
    }

    /// Whether environments are decrypted during assembly.
    ///
    /// Without a key or keystore cipher values pass through raw.
    pub fn decrypt_enabled(&self) -> bool {
        self.encrypt.enabled && self.key_mode() != KeyMode::Disabled
    }

    pub fn key_mode(&self) -> KeyMode {
        if self.encrypt.key.is_some() {
            KeyMode::Symmetric
        } else if self.encrypt.keystore.is_some() {
            KeyMode::Keystore
        } else {
            KeyMode::Disabled
        }
    }

    /// `"git"` or `"dir"`.
    pub fn source_kind(&self) -> &'static str {
        if self.source.git.is_some() {
            "git"
        } else {
            "dir"
        }
    }

    /// Source location with relative paths resolved.
    pub fn source_path(&self) -> Option<PathBuf> {
        self.source
            .git
            .as_ref()
            .or(self.source.dir.as_ref())
            .map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

fn default_search_paths() -> Vec<String> {
    constants::DEFAULT_SEARCH_PATHS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_timeout_secs() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_enabled() -> bool {
    true
}
