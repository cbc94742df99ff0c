//! Filesystem keystore of age key pairs.
//!
//! Entries live in a TOML file, optionally sealed with an age passphrase:
//!
//! ```toml
//! [keys.primary]
//! identity = "AGE-SECRET-KEY-1..."
//!
//! [keys.ops]
//! recipient = "age1..."
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ::age::armor::{ArmoredReader, ArmoredWriter, Format};
use ::age::secrecy::{ExposeSecret, SecretString};
use ::age::x25519;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{KeyMaterial, KeyPair, KeyProvider};
use crate::core::cipher::parse_recipient;
use crate::core::types::KeyAlias;
use crate::error::{KeyError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeystoreFile {
    #[serde(default)]
    keys: BTreeMap<String, KeyEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient: Option<String>,
}

/// Age key pairs addressed by alias.
pub struct Keystore {
    path: PathBuf,
    password: Option<Zeroizing<String>>,
    default_alias: Option<String>,
    entries: BTreeMap<KeyAlias, Arc<KeyPair>>,
}

impl Keystore {
    /// Open an existing keystore.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::ReadFailed` if the file is missing,
    /// `KeyError::InvalidFormat` if it cannot be unsealed or parsed, or
    /// `KeyError::UnknownKeyAlias` if `default_alias` is not in the file.
    pub fn open(
        path: impl AsRef<Path>,
        password: Option<&str>,
        default_alias: Option<&str>,
    ) -> Result<Self> {
        let store = Self::load(path.as_ref(), password, default_alias)?;
        if let Some(alias) = &store.default_alias {
            if !store.entries.contains_key(alias) {
                return Err(KeyError::UnknownKeyAlias(alias.clone()).into());
            }
        }
        Ok(store)
    }

    /// Open a keystore, starting empty if the file does not exist yet.
    pub fn open_or_create(
        path: impl AsRef<Path>,
        password: Option<&str>,
        default_alias: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path, password, default_alias);
        }
        debug!(path = %path.display(), "starting empty keystore");
        Ok(Self {
            path: path.to_path_buf(),
            password: password.map(|p| Zeroizing::new(p.to_string())),
            default_alias: default_alias.map(str::to_string),
            entries: BTreeMap::new(),
        })
    }

    fn load(path: &Path, password: Option<&str>, default_alias: Option<&str>) -> Result<Self> {
        debug!(path = %path.display(), sealed = password.is_some(), "loading keystore");

        #[cfg(unix)]
        {
            if let Err(e) = validate_file_permissions(path, 0o600) {
                warn!("{}", e);
            }
        }

        let raw = fs::read(path).map_err(KeyError::ReadFailed)?;
        let text = match password {
            Some(pass) => unseal(&raw, pass)?,
            None => Zeroizing::new(
                String::from_utf8(raw)
                    .map_err(|e| KeyError::InvalidFormat(format!("keystore is not UTF-8: {}", e)))?,
            ),
        };

        let file: KeystoreFile = toml::from_str(&text)
            .map_err(|e| KeyError::InvalidFormat(format!("keystore: {}", e)))?;

        let mut entries = BTreeMap::new();
        for (alias, entry) in file.keys {
            let pair = entry_to_pair(&alias, &entry)?;
            entries.insert(alias, Arc::new(pair));
        }

        debug!(keys = entries.len(), "keystore loaded");

        Ok(Self {
            path: path.to_path_buf(),
            password: password.map(|p| Zeroizing::new(p.to_string())),
            default_alias: default_alias.map(str::to_string),
            entries,
        })
    }

    /// Generate a new x25519 identity under `alias` and persist the keystore.
    ///
    /// # Returns
    ///
    /// The public key string (starts with "age1...").
    ///
    /// # Errors
    ///
    /// Returns `KeyError::AliasExists` if the alias is taken, or a write error.
    pub fn generate(&mut self, alias: &str) -> Result<String> {
        if alias.trim().is_empty() || alias.contains(['{', '}']) {
            return Err(KeyError::InvalidFormat(format!("invalid alias: '{}'", alias)).into());
        }
        if self.entries.contains_key(alias) {
            return Err(KeyError::AliasExists(alias.to_string()).into());
        }

        let identity = x25519::Identity::generate();
        let public_key = identity.to_public().to_string();
        self.entries
            .insert(alias.to_string(), Arc::new(KeyPair::private(alias, identity)));
        self.save()?;

        debug!(alias, "generated key");
        Ok(public_key)
    }

    /// Write the keystore back to disk with owner-only permissions.
    pub fn save(&self) -> Result<()> {
        let mut file = KeystoreFile::default();
        for (alias, pair) in &self.entries {
            let entry = match pair.identity() {
                Some(identity) => KeyEntry {
                    identity: Some(identity.to_string().expose_secret().to_string()),
                    recipient: None,
                },
                None => KeyEntry {
                    identity: None,
                    recipient: Some(pair.recipient().to_string()),
                },
            };
            file.keys.insert(alias.clone(), entry);
        }

        let text = Zeroizing::new(
            toml::to_string_pretty(&file)
                .map_err(|e| KeyError::InvalidFormat(format!("keystore: {}", e)))?,
        );
        let bytes = match &self.password {
            Some(pass) => seal(&text, pass)?,
            None => text.as_bytes().to_vec(),
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(KeyError::WriteFailed)?;
        }
        fs::write(&self.path, bytes).map_err(KeyError::WriteFailed)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(KeyError::WriteFailed)?;
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_alias(&self) -> Option<&str> {
        self.default_alias.as_deref()
    }

    /// Public key for an alias.
    pub fn public_key(&self, alias: &str) -> Option<String> {
        self.entries.get(alias).map(|p| p.recipient().to_string())
    }
}

impl KeyProvider for Keystore {
    fn default_key(&self) -> Result<KeyMaterial> {
        match &self.default_alias {
            Some(alias) => self.key(alias),
            None => Err(KeyError::NoDefaultKeyConfigured.into()),
        }
    }

    fn key(&self, alias: &str) -> Result<KeyMaterial> {
        self.entries
            .get(alias)
            .map(|pair| KeyMaterial::Asymmetric(Arc::clone(pair)))
            .ok_or_else(|| KeyError::UnknownKeyAlias(alias.to_string()).into())
    }

    fn aliases(&self) -> Vec<KeyAlias> {
        self.entries.keys().cloned().collect()
    }

    fn name(&self) -> &'static str {
        "keystore"
    }
}

fn entry_to_pair(alias: &str, entry: &KeyEntry) -> Result<KeyPair> {
    match (&entry.identity, &entry.recipient) {
        (Some(secret), recipient) => {
            let identity: x25519::Identity = secret.trim().parse().map_err(|e: &str| {
                KeyError::InvalidFormat(format!("identity for '{}': {}", alias, e))
            })?;
            if let Some(expected) = recipient {
                if identity.to_public().to_string() != expected.trim() {
                    return Err(KeyError::InvalidFormat(format!(
                        "recipient for '{}' does not match its identity",
                        alias
                    ))
                    .into());
                }
            }
            Ok(KeyPair::private(alias, identity))
        }
        (None, Some(recipient)) => Ok(KeyPair::public(alias, parse_recipient(recipient)?)),
        (None, None) => Err(KeyError::InvalidFormat(format!(
            "entry '{}' has neither identity nor recipient",
            alias
        ))
        .into()),
    }
}

fn unseal(raw: &[u8], password: &str) -> Result<Zeroizing<String>> {
    let passphrase = passphrase_identity(password);
    let decryptor = ::age::Decryptor::new(ArmoredReader::new(raw))
        .map_err(|e| KeyError::InvalidFormat(format!("sealed keystore: {}", e)))?;
    let mut reader = decryptor
        .decrypt(std::iter::once(&passphrase as &dyn ::age::Identity))
        .map_err(|e| KeyError::InvalidFormat(format!("cannot unseal keystore: {}", e)))?;

    let mut text = Zeroizing::new(String::new());
    reader
        .read_to_string(&mut text)
        .map_err(KeyError::ReadFailed)?;
    Ok(text)
}

fn seal(text: &str, password: &str) -> Result<Vec<u8>> {
    let encryptor =
        ::age::Encryptor::with_user_passphrase(SecretString::from(password.to_string()));

    let mut sealed = Vec::new();
    let armor =
        ArmoredWriter::wrap_output(&mut sealed, Format::AsciiArmor).map_err(KeyError::WriteFailed)?;
    let mut writer = encryptor.wrap_output(armor).map_err(KeyError::WriteFailed)?;
    writer
        .write_all(text.as_bytes())
        .map_err(KeyError::WriteFailed)?;
    let armor = writer.finish().map_err(KeyError::WriteFailed)?;
    armor.finish().map_err(KeyError::WriteFailed)?;

    Ok(sealed)
}

fn passphrase_identity(password: &str) -> ::age::scrypt::Identity {
    ::age::scrypt::Identity::new(SecretString::from(password.to_string()))
}

/// Validate file permissions (Unix only).
#[cfg(unix)]
fn validate_file_permissions(path: &Path, expected_mode: u32) -> std::result::Result<(), String> {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = fs::metadata(path) else {
        return Ok(());
    };
    let actual_mode = metadata.permissions().mode() & 0o777;
    if actual_mode != expected_mode {
        return Err(format!(
            "keystore {} has mode {:o}, expected {:o} (run: chmod {:o} {})",
            path.display(),
            actual_mode,
            expected_mode,
            expected_mode,
            path.display()
        ));
    }
    Ok(())
}
