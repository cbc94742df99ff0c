//! Configuration assembly.
//!
//! Merges parsed documents into an [`Environment`], decrypting cipher values
//! on the way. A value that cannot be decrypted never fails the request: its
//! key is renamed to `invalid.<key>` and keeps the raw cipher text.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::core::cipher::{CipherValue, TextCipher};
use crate::core::constants::INVALID_PREFIX;
use crate::core::domain::{Environment, Properties, PropertySource};
use crate::core::keys::KeyResolver;
use crate::error::Result;

/// A parsed document ready for assembly.
#[derive(Debug, Clone)]
pub struct Document {
    /// Origin used as the property source name.
    pub name: String,
    pub properties: Properties,
}

impl Document {
    pub fn new(name: impl Into<String>, properties: Properties) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }
}

/// Builds environments from ordered documents.
#[derive(Debug, Clone)]
pub struct Assembler {
    keys: KeyResolver,
    cipher: TextCipher,
}

impl Assembler {
    pub fn new(keys: KeyResolver) -> Self {
        Self {
            keys,
            cipher: TextCipher,
        }
    }

    /// Append `documents` to `env` in order, highest priority first.
    ///
    /// With `decrypt_enabled` false, cipher values pass through untouched.
    pub fn assemble(
        &self,
        mut env: Environment,
        documents: Vec<Document>,
        decrypt_enabled: bool,
    ) -> Environment {
        for document in documents {
            let properties = if decrypt_enabled {
                self.decrypt_properties(&document.name, document.properties)
            } else {
                document.properties
            };

            let name = document.name;
            if !env.push(PropertySource::new(name.clone(), properties)) {
                warn!(source = %name, "skipping duplicate property source");
            }
        }
        env
    }

    /// Decrypt one raw `{cipher}` value.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::MalformedValue` for bad grammar, a `KeyError` if
    /// the selector cannot be resolved, or `CipherError::DecryptionFailed`.
    pub fn decrypt_value(&self, raw: &str) -> Result<String> {
        let value = CipherValue::parse(raw)?;
        let key = self.keys.resolve(value.annotation())?;
        self.cipher.decrypt(value.payload(), &key)
    }

    fn decrypt_properties(&self, origin: &str, properties: Properties) -> Properties {
        let mut decrypted = 0usize;
        let literal: HashSet<String> = properties.keys().map(str::to_string).collect();
        let mut out = Properties::new();

        for (key, value) in properties {
            if !CipherValue::is_cipher(&value) {
                out.insert(key, value);
                continue;
            }
            match self.decrypt_value(&value) {
                Ok(plain) => {
                    decrypted += 1;
                    out.insert(key, plain);
                }
                Err(e) => {
                    warn!(source = origin, key = %key, code = e.code(), "cannot decrypt property");
                    let marked = format!("{}{}", INVALID_PREFIX, key);
                    // A key the document defines itself is never replaced.
                    if literal.contains(&marked) {
                        warn!(source = origin, key = %marked, "invalid marker collides with existing key");
                        continue;
                    }
                    out.insert(marked, value);
                }
            }
        }

        if decrypted > 0 {
            debug!(source = origin, decrypted, "decrypted properties");
        }
        out
    }
}
