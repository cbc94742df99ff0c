//! Key material resolution.
//!
//! Maps a cipher value's key selector to the key material that encrypts or
//! decrypts it. Key lookup goes through the [`KeyProvider`] capability so
//! deployments can plug in their own source of keys.
//!
//! ## Providers
//!
//! - [`SymmetricSecret`]: one shared secret, no aliases
//! - [`Keystore`]: age x25519 key pairs addressed by alias
//! - [`NoKeys`]: server-side cryptography disabled
//!
//! ## Adding a Provider
//!
//! ```ignore
//! struct Vault { /* ... */ }
//!
//! impl KeyProvider for Vault {
//!     fn default_key(&self) -> Result<KeyMaterial> { /* ... */ }
//!     fn key(&self, alias: &str) -> Result<KeyMaterial> { /* ... */ }
//!     fn name(&self) -> &'static str { "vault" }
//! }
//!
//! let resolver = KeyResolver::new(Arc::new(Vault { /* ... */ }));
//! ```

use std::fmt;
use std::sync::Arc;

use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use crate::core::cipher::CipherAnnotation;
use crate::core::types::KeyAlias;
use crate::error::{KeyError, Result};

mod keystore;
mod symmetric;

pub use keystore::Keystore;
pub use symmetric::SymmetricSecret;

/// Key material for one encrypt or decrypt operation.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Shared secret bytes; the cipher derives the actual key.
    Symmetric(Arc<Zeroizing<Vec<u8>>>),
    /// An x25519 key pair, possibly public-only.
    Asymmetric(Arc<KeyPair>),
}

impl KeyMaterial {
    /// Symmetric material from a secret string.
    pub fn symmetric(secret: &str) -> Self {
        KeyMaterial::Symmetric(Arc::new(Zeroizing::new(secret.as_bytes().to_vec())))
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Symmetric(_) => f.write_str("Symmetric(<redacted>)"),
            KeyMaterial::Asymmetric(pair) => f
                .debug_struct("Asymmetric")
                .field("alias", &pair.alias)
                .field("private", &pair.identity.is_some())
                .finish(),
        }
    }
}

/// An age key pair held in a keystore.
pub struct KeyPair {
    alias: String,
    recipient: x25519::Recipient,
    identity: Option<x25519::Identity>,
}

impl KeyPair {
    /// Pair with a private identity (can decrypt).
    pub fn private(alias: impl Into<String>, identity: x25519::Identity) -> Self {
        Self {
            alias: alias.into(),
            recipient: identity.to_public(),
            identity: Some(identity),
        }
    }

    /// Public-only pair (can encrypt, cannot decrypt).
    pub fn public(alias: impl Into<String>, recipient: x25519::Recipient) -> Self {
        Self {
            alias: alias.into(),
            recipient,
            identity: None,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn recipient(&self) -> &x25519::Recipient {
        &self.recipient
    }

    pub fn identity(&self) -> Option<&x25519::Identity> {
        self.identity.as_ref()
    }
}

/// Source of key material.
///
/// Implementations are loaded once at startup and treated as immutable.
pub trait KeyProvider: Send + Sync {
    /// The process-wide default key.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::NoDefaultKeyConfigured` if there is none.
    fn default_key(&self) -> Result<KeyMaterial>;

    /// Key material registered under `alias`.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::UnknownKeyAlias` if the alias is absent.
    fn key(&self, alias: &str) -> Result<KeyMaterial>;

    /// Known aliases, for display.
    fn aliases(&self) -> Vec<KeyAlias> {
        Vec::new()
    }

    /// Provider name for display/logging.
    fn name(&self) -> &'static str;
}

/// Provider used when server-side cryptography is disabled.
pub struct NoKeys;

impl KeyProvider for NoKeys {
    fn default_key(&self) -> Result<KeyMaterial> {
        Err(KeyError::NoDefaultKeyConfigured.into())
    }

    fn key(&self, alias: &str) -> Result<KeyMaterial> {
        Err(KeyError::UnknownKeyAlias(alias.to_string()).into())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Resolves key selectors to key material.
#[derive(Clone)]
pub struct KeyResolver {
    provider: Arc<dyn KeyProvider>,
}

impl KeyResolver {
    pub fn new(provider: Arc<dyn KeyProvider>) -> Self {
        Self { provider }
    }

    /// Resolver with no keys at all.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoKeys))
    }

    /// Resolve a selector.
    ///
    /// `Secret` selectors never touch the provider.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::NoDefaultKeyConfigured` or `KeyError::UnknownKeyAlias`.
    pub fn resolve(&self, selector: &CipherAnnotation) -> Result<KeyMaterial> {
        trace!(selector = %selector, provider = self.provider.name(), "resolving key");
        match selector {
            CipherAnnotation::None => self.provider.default_key(),
            CipherAnnotation::Secret(value) => Ok(KeyMaterial::symmetric(value)),
            CipherAnnotation::KeyAlias(alias) => self.provider.key(alias),
        }
    }

    pub fn provider(&self) -> &dyn KeyProvider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyResolver")
            .field("provider", &self.provider.name())
            .finish()
    }
}
