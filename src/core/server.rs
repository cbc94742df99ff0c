//! Config service facade.
//!
//! [`ConfigServer`] answers resolution requests by composing the repository
//! resolver, the document parser, and the assembler, and exposes manual
//! encrypt/decrypt utilities that bypass resolution entirely.
//!
//! Requests run under a read guard; [`ConfigServer::refresh`] takes the write
//! guard, so a single environment is never built from a mix of pre- and
//! post-refresh state.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::core::assembler::{Assembler, Document};
use crate::core::cipher::{CipherAnnotation, CipherValue, TextCipher};
use crate::core::config::Config;
use crate::core::document::{self, Encoding};
use crate::core::domain::{Environment, ResolutionRequest};
use crate::core::keys::KeyResolver;
use crate::core::resolver::{RepositoryResolver, ResolverOptions};
use crate::core::source::{Revision, VersionedSource};
use crate::error::Result;

/// The configuration service.
pub struct ConfigServer {
    resolver: RepositoryResolver,
    assembler: Assembler,
    keys: KeyResolver,
    cipher: TextCipher,
    decrypt_enabled: bool,
    generation: RwLock<()>,
}

impl ConfigServer {
    pub fn new(
        source: Arc<dyn VersionedSource>,
        keys: KeyResolver,
        options: ResolverOptions,
        decrypt_enabled: bool,
    ) -> Self {
        Self {
            resolver: RepositoryResolver::new(source, options),
            assembler: Assembler::new(keys.clone()),
            keys,
            cipher: TextCipher,
            decrypt_enabled,
            generation: RwLock::new(()),
        }
    }

    /// Build a server from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source or the key provider cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = config.open_source()?;
        let keys = KeyResolver::new(config.key_provider()?);
        debug!(
            source = %source.describe(),
            keys = keys.provider().name(),
            decrypt = config.decrypt_enabled(),
            "starting config server"
        );
        Ok(Self::new(
            source,
            keys,
            config.resolver_options(),
            config.decrypt_enabled(),
        ))
    }

    /// Resolve the environment for a request.
    ///
    /// No matching documents yields an empty environment, not an error.
    ///
    /// # Errors
    ///
    /// - `SourceError::RevisionNotFound` if the label does not exist
    /// - `SourceError::Unavailable` on I/O failure or timeout
    /// - `DocumentError::Malformed` if any applicable document is invalid
    pub fn get_environment(&self, request: &ResolutionRequest) -> Result<Environment> {
        let _guard = self.generation.read();

        let revision = self.resolver.resolve_revision(request.label())?;
        let locations = self.resolver.documents_at(&revision, request)?;

        let env = Environment::new(
            request.application(),
            request.profiles().into_iter().map(str::to_string).collect(),
            Some(revision.name.clone()),
            Some(revision.id.clone()),
        );
        if locations.is_empty() {
            debug!(
                application = request.application(),
                profile = request.profile(),
                "no documents matched, returning empty environment"
            );
            return Ok(env);
        }

        let origin = self.resolver.source().describe();
        let mut documents = Vec::with_capacity(locations.len());
        for location in &locations {
            let name = format!("{}/{}", origin, location.path);
            let raw = self.resolver.read(&revision, location)?;
            let properties = document::parse(&raw, location.encoding, &name)?;
            documents.push(Document::new(name, properties));
        }

        Ok(self
            .assembler
            .assemble(env, documents, self.decrypt_enabled))
    }

    /// Resolve a request and serialize the merged properties.
    pub fn render(&self, request: &ResolutionRequest, encoding: Encoding) -> Result<String> {
        let env = self.get_environment(request)?;
        document::serialize(&env.flatten(), encoding)
    }

    /// Encrypt a value, returning the full `{cipher}` text.
    ///
    /// The selector is embedded unless it is the default key.
    ///
    /// # Errors
    ///
    /// - `KeyError::NoDefaultKeyConfigured` / `KeyError::UnknownKeyAlias`
    /// - `CipherError::MalformedValue` if the selector cannot be embedded
    /// - `CipherError::EncryptionFailed`
    pub fn encrypt_value(&self, plaintext: &str, selector: &CipherAnnotation) -> Result<String> {
        let key = self.keys.resolve(selector)?;
        let payload = self.cipher.encrypt(plaintext, &key)?;
        debug!(selector = %selector, "encrypted value");
        CipherValue::format(selector, &payload)
    }

    /// Decrypt a value produced by [`encrypt_value`](Self::encrypt_value).
    ///
    /// Accepts the full `{cipher}` text or a bare base64 payload. A selector
    /// embedded in the text takes precedence over `selector`.
    ///
    /// # Errors
    ///
    /// - `KeyError::NoDefaultKeyConfigured` / `KeyError::UnknownKeyAlias`
    /// - `CipherError::DecryptionFailed` for bad ciphertext
    pub fn decrypt_value(&self, ciphertext: &str, selector: &CipherAnnotation) -> Result<String> {
        let ciphertext = ciphertext.trim();
        let (selector, payload) = if CipherValue::is_cipher(ciphertext) {
            let value = CipherValue::parse(ciphertext)?;
            let selector = match value.annotation() {
                CipherAnnotation::None => selector.clone(),
                embedded => embedded.clone(),
            };
            (selector, value.payload())
        } else {
            (selector.clone(), ciphertext)
        };

        let key = self.keys.resolve(&selector)?;
        self.cipher.decrypt(payload, &key)
    }

    /// Drop cached existence lookups and refresh the source.
    ///
    /// Waits for in-flight requests. Environments already returned are
    /// unaffected.
    pub fn refresh(&self) -> Result<()> {
        let _guard = self.generation.write();
        self.resolver.refresh()?;
        info!(source = %self.resolver.source().describe(), "refreshed");
        Ok(())
    }

    /// Named revisions of the source.
    pub fn revisions(&self) -> Result<Vec<Revision>> {
        let _guard = self.generation.read();
        self.resolver.revisions()
    }

    /// The revision requests without a label resolve to.
    pub fn default_revision(&self) -> Result<Revision> {
        let _guard = self.generation.read();
        self.resolver.resolve_revision(None)
    }

    pub fn keys(&self) -> &KeyResolver {
        &self.keys
    }

    pub fn decrypt_enabled(&self) -> bool {
        self.decrypt_enabled
    }

    /// Description of the underlying source.
    pub fn describe_source(&self) -> String {
        self.resolver.source().describe()
    }
}
