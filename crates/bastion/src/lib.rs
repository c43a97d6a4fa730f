//! Bastion: an anti-nuke moderation agent for Discord servers.
//!
//! This crate holds the `bastion` binary and its configuration. The
//! enforcement rules live in `bastion_guard`, the state files in
//! `bastion_store`, and the Discord connection in `bastion_discord`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;

pub use config::{BastionConfig, BastionConfigBuilder, BastionConfigBuilderError, FileNames};
