//! Key generation command.

use std::path::Path;

use tracing::info;

use crate::cli::{load_config, output};
use crate::error::Result;

/// Add a new age identity to the configured keystore.
pub fn execute(config: Option<&Path>, alias: &str) -> Result<()> {
    let (_, config) = load_config(config)?;
    let mut keystore = config.open_keystore()?;

    let public_key = keystore.generate(alias)?;
    info!(alias, path = %keystore.path().display(), "key generated");

    output::success(&format!("generated key {}", output::key(alias)));
    output::kv("public key", &public_key);
    output::kv("keystore", output::path(&keystore.path().display().to_string()));

    if keystore.default_alias().is_none() {
        println!();
        output::hint(&format!(
            "set {} to use it for values without a selector",
            output::cmd(&format!("default_alias = \"{}\"", alias))
        ));
    }
    Ok(())
}
