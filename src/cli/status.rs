//! Quick status overview command.

use std::path::Path;

use colored::Colorize;

use crate::cli::{load_config, output};
use crate::core::config::KeyMode;
use crate::core::server::ConfigServer;
use crate::error::Result;

/// Show quick status overview.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let (path, config) = load_config(config_path)?;
    let server = ConfigServer::from_config(&config)?;

    output::section("Cellar Status");
    output::kv("config", output::path(&path.display().to_string()));
    output::kv("source", output::path(&server.describe_source()));

    // Default revision and the labels requests may use
    let default = server.default_revision()?;
    output::kv(
        "default",
        format!("{} {}", default.name, short_id(&default.id).dimmed()),
    );
    let revisions = server.revisions()?;
    output::kv(
        "labels",
        format!(
            "{} revision{}",
            revisions.len(),
            if revisions.len() == 1 { "" } else { "s" }
        ),
    );

    let search = config
        .source
        .search_paths
        .iter()
        .map(|p| if p.is_empty() { "/" } else { p.as_str() })
        .collect::<Vec<_>>()
        .join(", ");
    output::kv("search", search);

    // Encryption
    let mode = config.key_mode();
    let decrypt = if server.decrypt_enabled() {
        format!("{} server-side", "✓".green())
    } else {
        format!("{} pass-through", "-".dimmed())
    };
    output::kv("keys", mode);
    output::kv("decrypt", decrypt);

    let aliases = server.keys().provider().aliases();
    if !aliases.is_empty() {
        println!();
        output::header("Keys");
        for alias in &aliases {
            output::list_item(&output::key(alias));
        }
    }

    println!();
    match mode {
        KeyMode::Disabled => output::hint(&format!(
            "Enable encryption with {} or an [encrypt.keystore] section",
            output::cmd("encrypt.key")
        )),
        KeyMode::Keystore if aliases.is_empty() => output::hint(&format!(
            "Generate a key with {}",
            output::cmd("cellar keygen <alias>")
        )),
        _ => output::dimmed(&format!(
            "Use {} to resolve an environment",
            output::cmd("cellar env <app> <profile>")
        )),
    }

    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
