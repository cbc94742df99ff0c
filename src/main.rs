//! Cellar - Git-backed configuration service with property encryption.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cellar::cli::output;
use cellar::cli::{execute, Cli};
use cellar::core::constants;
use cellar::error::{ConfigError, Error, KeyError, SourceError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(constants::LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cellar=debug")
        } else {
            EnvFilter::new("cellar=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli.command, cli.config.as_deref()) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(_)) => {
                Some("create cellar.toml or pass --config <path>")
            }
            Error::Config(ConfigError::MissingField {
                field: "encrypt.keystore",
            }) => Some("add an [encrypt.keystore] section to cellar.toml"),
            Error::Key(KeyError::NoDefaultKeyConfigured) => {
                Some("set encrypt.key, CELLAR_ENCRYPT_KEY, or encrypt.keystore.default_alias")
            }
            Error::Key(KeyError::ReadFailed(_)) => Some("run: cellar keygen <alias>"),
            Error::Source(SourceError::RevisionNotFound(_)) => {
                Some("run: cellar status to see the default label")
            }
            _ => None,
        };

        output::error(&format!("{} [{}]", e, e.code()));
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(e.exit_code());
    }
}
