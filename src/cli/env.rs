//! Environment resolution commands.

use std::path::Path;

use crate::cli::{open_server, output, Format};
use crate::core::document::Encoding;
use crate::core::domain::{Environment, ResolutionRequest};
use crate::error::Result;

/// Resolve and print an environment.
pub fn show(
    config: Option<&Path>,
    application: &str,
    profile: &str,
    label: Option<String>,
    json: bool,
) -> Result<()> {
    let request = ResolutionRequest::new(application, profile, label)?;
    let server = open_server(config)?;
    let env = server.get_environment(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&env)?);
        return Ok(());
    }

    print_environment(&env);
    Ok(())
}

/// Resolve and print the merged properties as one document.
pub fn render(
    config: Option<&Path>,
    application: &str,
    profile: &str,
    label: Option<String>,
    format: Format,
) -> Result<()> {
    let request = ResolutionRequest::new(application, profile, label)?;
    let encoding = match format {
        Format::Properties => Encoding::Properties,
        Format::Yml => Encoding::Yaml,
    };

    let server = open_server(config)?;
    // Plain output for piping into files
    print!("{}", server.render(&request, encoding)?);
    Ok(())
}

fn print_environment(env: &Environment) {
    output::header(&format!(
        "{} ({})",
        env.name(),
        env.profiles().join(",")
    ));
    output::kv("label", env.label().unwrap_or("-"));
    output::kv("version", env.version().unwrap_or("-"));

    if env.is_empty() {
        println!();
        output::dimmed("no documents matched");
        return;
    }

    for source in env.property_sources() {
        output::section(&output::path(source.name()));
        for (key, value) in source.properties().iter() {
            output::property(key, value);
        }
    }
}
