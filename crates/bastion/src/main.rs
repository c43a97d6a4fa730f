//! Bastion CLI binary.
//!
//! - Run the moderation agent against Discord
//! - Inspect and toggle feature flags offline
//! - Edit the deny-list, allow-list and operator sets offline

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_features_command, handle_list_command, run_bot};

    // Pick up DISCORD_TOKEN and RUST_LOG from a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = bastion::BastionConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { token } => {
            run_bot(&config, &token).await?;
        }

        Commands::Features(command) => {
            handle_features_command(command, &config).await?;
        }

        Commands::List(command) => {
            handle_list_command(command, &config).await?;
        }
    }

    Ok(())
}
