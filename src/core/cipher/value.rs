//! Cipher value text grammar.
//!
//! ```text
//! cipher-value = "{cipher}" [ selector ] payload
//! selector     = "{secret:" value "}" | "{key:" alias "}"
//! payload      = base64 ciphertext
//! ```
//!
//! The marker is case-sensitive, must start the raw value, and at most one
//! selector is allowed.

use std::fmt;

use crate::core::constants::CIPHER_MARKER;
use crate::error::{CipherError, Result};

/// Key selector carried by a cipher value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CipherAnnotation {
    /// Use the process-wide default key.
    #[default]
    None,
    /// Derive a one-off symmetric key from this value.
    Secret(String),
    /// Use the keystore entry with this alias.
    KeyAlias(String),
}

impl CipherAnnotation {
    /// Textual prefix for this selector (empty for the default key).
    ///
    /// # Errors
    ///
    /// Returns `CipherError::MalformedValue` if the value cannot be written
    /// inside braces.
    pub fn prefix(&self) -> Result<String> {
        let (name, value) = match self {
            CipherAnnotation::None => return Ok(String::new()),
            CipherAnnotation::Secret(s) => ("secret", s),
            CipherAnnotation::KeyAlias(a) => ("key", a),
        };
        if value.is_empty() || value.contains(['{', '}']) {
            return Err(CipherError::MalformedValue(format!(
                "{} selector value cannot be empty or contain braces",
                name
            ))
            .into());
        }
        Ok(format!("{{{}:{}}}", name, value))
    }
}

impl fmt::Display for CipherAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherAnnotation::None => f.write_str("default"),
            // never print the ad hoc secret itself
            CipherAnnotation::Secret(_) => f.write_str("secret"),
            CipherAnnotation::KeyAlias(a) => write!(f, "key:{}", a),
        }
    }
}

/// A parsed `{cipher}` value borrowing from the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherValue<'a> {
    annotation: CipherAnnotation,
    payload: &'a str,
}

impl<'a> CipherValue<'a> {
    /// Whether a raw value carries the cipher marker.
    pub fn is_cipher(raw: &str) -> bool {
        raw.starts_with(CIPHER_MARKER)
    }

    /// Parse a raw `{cipher}...` value.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::MalformedValue` if the marker is missing, a
    /// selector is unterminated or unknown, or more than one selector is
    /// present.
    pub fn parse(raw: &'a str) -> Result<Self> {
        let rest = raw
            .strip_prefix(CIPHER_MARKER)
            .ok_or_else(|| CipherError::MalformedValue("missing {cipher} marker".to_string()))?;

        let (annotation, payload) = match rest.strip_prefix('{') {
            None => (CipherAnnotation::None, rest),
            Some(body) => {
                let end = body.find('}').ok_or_else(|| {
                    CipherError::MalformedValue("unterminated key selector".to_string())
                })?;
                (parse_selector(&body[..end])?, &body[end + 1..])
            }
        };

        if payload.starts_with('{') {
            return Err(
                CipherError::MalformedValue("at most one key selector is allowed".to_string())
                    .into(),
            );
        }

        Ok(Self {
            annotation,
            payload,
        })
    }

    /// Render a cipher value from a selector and base64 payload.
    pub fn format(annotation: &CipherAnnotation, payload: &str) -> Result<String> {
        Ok(format!("{}{}{}", CIPHER_MARKER, annotation.prefix()?, payload))
    }

    pub fn annotation(&self) -> &CipherAnnotation {
        &self.annotation
    }

    /// Base64 ciphertext following the marker and selector.
    pub fn payload(&self) -> &'a str {
        self.payload
    }
}

fn parse_selector(body: &str) -> Result<CipherAnnotation> {
    let (name, value) = body.split_once(':').ok_or_else(|| {
        CipherError::MalformedValue(format!("key selector missing ':' in {{{}}}", body))
    })?;

    if value.is_empty() {
        return Err(CipherError::MalformedValue(format!("empty {} selector", name)).into());
    }

    match name {
        "secret" => Ok(CipherAnnotation::Secret(value.to_string())),
        "key" => Ok(CipherAnnotation::KeyAlias(value.to_string())),
        other => Err(CipherError::MalformedValue(format!("unknown key selector: {}", other)).into()),
    }
}
