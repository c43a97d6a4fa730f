//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the bastion binary.

mod commands;
mod features;
mod lists;
mod run;

pub use commands::{Cli, Commands};
pub use features::handle_features_command;
pub use lists::handle_list_command;
pub use run::run_bot;
