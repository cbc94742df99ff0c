//! Command-line interface.

pub mod completions;
pub mod crypt;
pub mod env;
pub mod keygen;
pub mod output;
pub mod status;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::core::cipher::CipherAnnotation;
use crate::core::config::Config;
use crate::core::constants;
use crate::core::server::ConfigServer;
use crate::error::Result;

/// Cellar - Git-backed configuration service with property encryption.
#[derive(Parser)]
#[command(
    name = "cellar",
    about = "Git-backed configuration service with property encryption",
    version
)]
pub struct Cli {
    /// Path to the config file (default: ./cellar.toml)
    #[arg(long, global = true, env = constants::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve the environment for an application and profile
    Env {
        /// Application name
        application: String,
        /// Profile, or comma-separated profiles (later wins)
        profile: String,
        /// Branch, tag, or commit; `(_)` stands for `/`
        label: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the merged properties as a single document
    Render {
        application: String,
        profile: String,
        #[arg(short, long)]
        label: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Properties)]
        format: Format,
    },

    /// Encrypt a value into {cipher} text
    Encrypt {
        /// Plaintext value
        value: String,
        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Decrypt {cipher} text or a bare base64 payload
    Decrypt {
        /// Cipher text
        value: String,
        #[command(flatten)]
        selector: SelectorArgs,
    },

    /// Generate a new key pair in the configured keystore
    Keygen {
        /// Alias for the new key
        alias: String,
    },

    /// Show quick status overview
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Key selection for encrypt/decrypt.
#[derive(Args, Debug, Default)]
pub struct SelectorArgs {
    /// Use the keystore entry with this alias
    #[arg(short, long, conflicts_with = "secret")]
    pub key: Option<String>,
    /// Use an ad hoc secret instead of a configured key
    #[arg(short, long)]
    pub secret: Option<String>,
}

impl SelectorArgs {
    pub fn annotation(&self) -> CipherAnnotation {
        match (&self.key, &self.secret) {
            (Some(alias), _) => CipherAnnotation::KeyAlias(alias.clone()),
            (None, Some(secret)) => CipherAnnotation::Secret(secret.clone()),
            (None, None) => CipherAnnotation::None,
        }
    }
}

/// Rendered document format.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Format {
    Properties,
    Yml,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command, config: Option<&Path>) -> Result<()> {
    use Command::*;

    match command {
        Env {
            application,
            profile,
            label,
            json,
        } => env::show(config, &application, &profile, label, json),
        Render {
            application,
            profile,
            label,
            format,
        } => env::render(config, &application, &profile, label, format),
        Encrypt { value, selector } => crypt::encrypt(config, &value, &selector.annotation()),
        Decrypt { value, selector } => crypt::decrypt(config, &value, &selector.annotation()),
        Keygen { alias } => keygen::execute(config, &alias),
        Status => status::execute(config),
        Completions { shell } => completions::execute(shell),
    }
}

/// Load the config file the command line points at.
pub(crate) fn load_config(path: Option<&Path>) -> Result<(PathBuf, Config)> {
    let path = Config::config_path(path);
    let config = Config::load(&path)?;
    Ok((path, config))
}

/// Load the config and start a server from it.
pub(crate) fn open_server(path: Option<&Path>) -> Result<ConfigServer> {
    let (_, config) = load_config(path)?;
    ConfigServer::from_config(&config)
}
