//! Symmetric backend: AES-256-GCM.
//!
//! The key is derived from the configured secret with PBKDF2-HMAC-SHA256 and
//! a fresh random salt per value. Layout of the raw ciphertext:
//!
//! ```text
//! salt (16) || nonce (12) || ciphertext + tag
//! ```

use aes_gcm::aead::{Aead as _, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::trace;
use zeroize::Zeroizing;

use super::Cipher;
use crate::error::{CipherError, Result};

const PBKDF2_ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256-GCM backend keyed by a shared secret.
pub struct AesGcm;

impl Cipher for AesGcm {
    type Recipient = [u8];
    type Identity = [u8];

    fn name(&self) -> &'static str {
        "aes-256-gcm"
    }

    fn encrypt(&self, plaintext: &str, secret: &[u8]) -> Result<Vec<u8>> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(secret, &salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);

        trace!(ciphertext_len = out.len(), "encrypted");
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], secret: &[u8]) -> Result<String> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting");

        if ciphertext.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(CipherError::DecryptionFailed(format!(
                "ciphertext too short: {} bytes",
                ciphertext.len()
            ))
            .into());
        }

        let (salt, rest) = ciphertext.split_at(SALT_LEN);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);

        let key = derive_key(secret, salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::DecryptionFailed("integrity check failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| CipherError::DecryptionFailed(format!("UTF-8 error: {}", e)).into())
    }
}

fn derive_key(secret: &[u8], salt: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2_hmac::<Sha256>(secret, salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}
