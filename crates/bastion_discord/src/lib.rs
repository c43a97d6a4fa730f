//! Discord adapter for the Bastion moderation agent.
//!
//! Connects the platform-neutral enforcement engine to Discord through
//! serenity:
//!
//! - **gateway**: [`SerenityGateway`], the [`bastion_guard::ModerationGateway`]
//!   implementation over serenity's HTTP client, with a member presence cache
//! - **handler**: [`BastionHandler`], the serenity `EventHandler` that routes
//!   events to the engine and operator commands to the console
//! - **client**: [`BastionBot`], client construction and lifecycle
//! - **conversions**: id, role, permission and error mapping

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod conversions;
mod gateway;
mod handler;

pub use client::BastionBot;
pub use conversions::{audit_action, capabilities_from, gateway_error, platform_id, role_state};
pub use gateway::SerenityGateway;
pub use handler::BastionHandler;
