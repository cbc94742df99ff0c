//! Property document parsing and serialization.
//!
//! Two encodings are supported:
//!
//! - **properties**: line-oriented `key=value`, later duplicates win
//! - **yaml**: nested mappings flattened to dot-separated keys
//!
//! Values are always plain strings at this layer.

use std::fmt;
use std::path::Path;

use crate::core::domain::Properties;
use crate::error::{DocumentError, Result};

mod properties;
mod yaml;

/// Textual encoding of a property document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Line-oriented `key=value`.
    Properties,
    /// Nested mapping (YAML).
    Yaml,
}

impl Encoding {
    /// Lookup order for a base name: nested encodings first.
    pub const LOOKUP_ORDER: &'static [(Encoding, &'static str)] = &[
        (Encoding::Yaml, "yml"),
        (Encoding::Yaml, "yaml"),
        (Encoding::Properties, "properties"),
    ];

    /// Encoding for a file extension.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::UnsupportedEncoding` for unknown extensions.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "properties" => Ok(Encoding::Properties),
            "yml" | "yaml" => Ok(Encoding::Yaml),
            other => Err(DocumentError::UnsupportedEncoding(other.to_string()).into()),
        }
    }

    /// Encoding for a document path, by extension.
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Encoding::Properties => "properties",
            Encoding::Yaml => "yml",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parse a raw document into an ordered property map.
///
/// `origin` names the document in error messages.
///
/// # Errors
///
/// Returns `DocumentError::Malformed` on structurally invalid input.
pub fn parse(raw: &[u8], encoding: Encoding, origin: &str) -> Result<Properties> {
    let text = std::str::from_utf8(raw).map_err(|e| malformed(origin, e))?;
    match encoding {
        Encoding::Properties => properties::parse(text, origin),
        Encoding::Yaml => yaml::parse(text, origin),
    }
}

/// Serialize a property map in the given encoding.
///
/// # Errors
///
/// Returns `DocumentError::Malformed` if the YAML emitter rejects the tree.
pub fn serialize(props: &Properties, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Properties => Ok(properties::serialize(props)),
        Encoding::Yaml => yaml::serialize(props),
    }
}

fn malformed(origin: &str, reason: impl fmt::Display) -> crate::error::Error {
    DocumentError::Malformed {
        path: origin.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
