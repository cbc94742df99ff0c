//! Cellar - Git-backed configuration service with property encryption.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── env           # Resolve and render environments
//! │   ├── crypt         # Manual encrypt/decrypt
//! │   ├── keygen        # Add keys to the keystore
//! │   ├── status        # Configuration overview
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # cellar.toml management
//!     ├── domain/       # Environment, PropertySource, ResolutionRequest
//!     ├── source/       # Versioned sources (git, directory, memory)
//!     ├── resolver      # Candidate documents and override order
//!     ├── document/     # .properties and YAML parsing/serialization
//!     ├── keys/         # Key resolution, keystore, symmetric secret
//!     ├── cipher/       # AES-GCM and age backends, {cipher} grammar
//!     ├── assembler     # Merge + transparent decryption
//!     └── server        # ConfigServer facade
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cellar::core::domain::ResolutionRequest;
//! use cellar::core::keys::{KeyResolver, SymmetricSecret};
//! use cellar::core::resolver::ResolverOptions;
//! use cellar::core::server::ConfigServer;
//! use cellar::core::source::GitSource;
//!
//! # fn main() -> cellar::error::Result<()> {
//! let source = Arc::new(GitSource::open("/srv/config", None)?);
//! let keys = KeyResolver::new(Arc::new(SymmetricSecret::new("s3cret")?));
//! let server = ConfigServer::new(source, keys, ResolverOptions::default(), true);
//!
//! let request = ResolutionRequest::new("config-client", "development", None)?;
//! let env = server.get_environment(&request)?;
//! println!("{:?}", env.get("user.role"));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
