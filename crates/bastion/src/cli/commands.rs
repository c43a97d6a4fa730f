//! CLI command definitions.

use bastion_store::SetName;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bastion - anti-nuke moderation agent for Discord servers
#[derive(Parser, Debug)]
#[command(name = "bastion")]
#[command(about = "Anti-nuke moderation agent for Discord servers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to Discord and enforce until stopped
    Run {
        /// Bot token
        #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Feature flag commands
    #[command(subcommand)]
    Features(FeatureCommands),

    /// Identifier set commands
    #[command(subcommand)]
    List(ListCommands),
}

/// Feature flag subcommands
#[derive(Subcommand, Debug)]
pub enum FeatureCommands {
    /// Show every flag
    List,

    /// Turn features on
    Enable {
        /// Feature names (aliases such as `bots` or `ru` are accepted)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Turn features off
    Disable {
        /// Feature names (aliases such as `bots` or `ru` are accepted)
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Identifier set subcommands
#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Print a set
    View {
        /// blacklist, whitelist, operators or tickets
        set: SetName,
    },

    /// Add identifiers to a set
    Add {
        /// blacklist, whitelist, operators or tickets
        set: SetName,

        /// Identifiers or mentions
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove identifiers from a set
    Remove {
        /// blacklist, whitelist, operators or tickets
        set: SetName,

        /// Identifiers or mentions
        #[arg(required = true)]
        ids: Vec<String>,
    },
}
