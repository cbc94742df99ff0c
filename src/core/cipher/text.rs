//! Text-level encryption over resolved key material.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::trace;

use super::{Age, AesGcm, Cipher};
use crate::core::keys::KeyMaterial;
use crate::error::{CipherError, Result};

/// Encrypts and decrypts property values, base64 in and out.
///
/// Symmetric material uses [`AesGcm`], asymmetric material uses [`Age`].
/// Every failure on the decrypt path is a `CipherError::DecryptionFailed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCipher;

impl TextCipher {
    /// Encrypt plaintext, returning base64 ciphertext.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if the backend fails.
    pub fn encrypt(&self, plaintext: &str, key: &KeyMaterial) -> Result<String> {
        let raw = match key {
            KeyMaterial::Symmetric(secret) => AesGcm.encrypt(plaintext, secret.as_slice())?,
            KeyMaterial::Asymmetric(pair) => Age.encrypt(plaintext, pair.recipient())?,
        };
        Ok(BASE64.encode(raw))
    }

    /// Decrypt base64 ciphertext.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` on corrupt base64, integrity
    /// failure, a public-only key, or a key of the wrong kind.
    pub fn decrypt(&self, ciphertext: &str, key: &KeyMaterial) -> Result<String> {
        let raw = BASE64
            .decode(ciphertext.trim())
            .map_err(|e| CipherError::DecryptionFailed(format!("invalid base64: {}", e)))?;

        match key {
            KeyMaterial::Symmetric(secret) => {
                trace!(backend = AesGcm.name(), "decrypting value");
                AesGcm.decrypt(&raw, secret.as_slice())
            }
            KeyMaterial::Asymmetric(pair) => {
                trace!(backend = Age.name(), alias = pair.alias(), "decrypting value");
                let identity = pair.identity().ok_or_else(|| {
                    CipherError::DecryptionFailed(format!(
                        "key '{}' has no private key",
                        pair.alias()
                    ))
                })?;
                Age.decrypt(&raw, identity)
            }
        }
    }
}
