//! Property value encryption.
//!
//! Provides the encryption/decryption abstraction and its implementations.
//!
//! ## Backends
//!
//! - **aes**: Symmetric. AES-256-GCM with a PBKDF2-derived key.
//! - **age**: Asymmetric. x25519 recipients, the private identity decrypts.
//!
//! [`TextCipher`] picks the backend from the resolved [`KeyMaterial`] and
//! handles the base64 transport encoding; [`CipherValue`] parses the
//! `{cipher}{key:alias}...` text grammar stored in documents.
//!
//! [`KeyMaterial`]: crate::core::keys::KeyMaterial

use crate::error::Result;

mod aes;
mod age;
mod text;
mod value;

pub use self::aes::AesGcm;
pub use self::age::{parse_recipient, Age};
pub use text::TextCipher;
pub use value::{CipherAnnotation, CipherValue};

/// Cryptographic backend trait.
///
/// Recipients and identities are backend-specific:
/// - aes: the shared secret on both sides
/// - age: x25519 public key to encrypt, x25519 identity to decrypt
pub trait Cipher {
    /// Key material needed to encrypt.
    type Recipient: ?Sized;

    /// Key material needed to decrypt.
    type Identity: ?Sized;

    /// Encrypt plaintext, returning raw ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if encryption fails.
    fn encrypt(&self, plaintext: &str, recipient: &Self::Recipient) -> Result<Vec<u8>>;

    /// Decrypt raw ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` on integrity failure, wrong
    /// key, or non-UTF-8 plaintext.
    fn decrypt(&self, ciphertext: &[u8], identity: &Self::Identity) -> Result<String>;

    /// Backend name for display/logging.
    fn name(&self) -> &'static str;
}
