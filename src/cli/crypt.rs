//! Manual encrypt/decrypt commands.
//!
//! Both print the bare result on stdout so they compose with shell pipelines.

use std::path::Path;

use tracing::debug;

use crate::cli::open_server;
use crate::core::cipher::CipherAnnotation;
use crate::error::Result;

/// Encrypt a value and print the `{cipher}` text.
pub fn encrypt(config: Option<&Path>, value: &str, selector: &CipherAnnotation) -> Result<()> {
    debug!(selector = %selector, "encrypt");
    let server = open_server(config)?;
    println!("{}", server.encrypt_value(value, selector)?);
    Ok(())
}

/// Decrypt a value and print the plaintext.
pub fn decrypt(config: Option<&Path>, value: &str, selector: &CipherAnnotation) -> Result<()> {
    debug!(selector = %selector, "decrypt");
    let server = open_server(config)?;
    println!("{}", server.decrypt_value(value, selector)?);
    Ok(())
}
