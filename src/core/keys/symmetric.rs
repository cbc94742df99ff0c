//! Single shared-secret provider.

use super::{KeyMaterial, KeyProvider};
use crate::error::{KeyError, Result};

/// One symmetric secret used as the default key.
///
/// Has no aliases; `{key:...}` selectors fail with `UnknownKeyAlias`.
pub struct SymmetricSecret {
    key: KeyMaterial,
}

impl SymmetricSecret {
    /// # Errors
    ///
    /// Returns `KeyError::InvalidFormat` if the secret is empty.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(KeyError::InvalidFormat("symmetric secret is empty".to_string()).into());
        }
        Ok(Self {
            key: KeyMaterial::symmetric(secret),
        })
    }
}

impl KeyProvider for SymmetricSecret {
    fn default_key(&self) -> Result<KeyMaterial> {
        Ok(self.key.clone())
    }

    fn key(&self, alias: &str) -> Result<KeyMaterial> {
        Err(KeyError::UnknownKeyAlias(alias.to_string()).into())
    }

    fn name(&self) -> &'static str {
        "symmetric"
    }
}
