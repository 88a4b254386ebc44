use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fh_gateway::cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to chat when no subcommand is given.
        None | Some(Command::Chat { user: None }) => {
            init_cli_tracing();
            let (config, _) = fh_gateway::cli::load_config()?;
            fh_gateway::cli::chat::chat(Arc::new(config), None).await
        }
        Some(Command::Chat { user }) => {
            init_cli_tracing();
            let (config, _) = fh_gateway::cli::load_config()?;
            fh_gateway::cli::chat::chat(Arc::new(config), user).await
        }
        Some(Command::Run { message, user }) => {
            init_cli_tracing();
            let (config, _) = fh_gateway::cli::load_config()?;
            fh_gateway::cli::run::run(Arc::new(config), message, user).await
        }
        Some(Command::Seed { user, clear }) => {
            init_cli_tracing();
            let (config, _) = fh_gateway::cli::load_config()?;
            fh_gateway::cli::seed::seed(Arc::new(config), user, clear)
        }
        Some(Command::Doctor) => {
            init_cli_tracing();
            let (config, config_path) = fh_gateway::cli::load_config()?;
            let passed = fh_gateway::cli::doctor::run(&config, &config_path);
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = fh_gateway::cli::load_config()?;
            let valid = fh_gateway::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = fh_gateway::cli::load_config()?;
            fh_gateway::cli::config::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("farmhand {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize compact stderr-only tracing for CLI commands.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
