pub mod chat;
pub mod config;
pub mod doctor;
pub mod run;
pub mod seed;

use clap::{Parser, Subcommand};

/// FarmHand — a conversational assistant for farm operations.
#[derive(Debug, Parser)]
#[command(name = "farmhand", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive chat REPL (default when no subcommand is given).
    Chat {
        /// User identifier (defaults to [chat].default_user from config).
        #[arg(long)]
        user: Option<String>,
    },
    /// Send a single message and print the response.
    Run {
        /// The message to send.
        message: String,
        /// User identifier (defaults to [chat].default_user from config).
        #[arg(long)]
        user: Option<String>,
    },
    /// Populate the store with realistic demo activities.
    Seed {
        /// User identifier to seed (defaults to [chat].default_user).
        #[arg(long)]
        user: Option<String>,
        /// Delete the user's existing data first.
        #[arg(long)]
        clear: bool,
    },
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `FH_CONFIG` (or
/// `farmhand.toml` by default).  Returns the parsed config and the path
/// that was used.
///
/// A missing file is not an error; defaults apply, matching the other
/// subcommands' expectations.
pub fn load_config() -> anyhow::Result<(fh_domain::config::Config, String)> {
    let config_path =
        std::env::var("FH_CONFIG").unwrap_or_else(|_| "farmhand.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        fh_domain::config::Config::default()
    };

    Ok((config, config_path))
}
