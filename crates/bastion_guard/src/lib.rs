//! Moderation enforcement for the Bastion agent.
//!
//! This crate holds the decision logic and nothing platform specific:
//!
//! - [`AuditResolver`] attributes an event to the member who caused it
//! - [`EnforcementEngine`] applies the per-event rules and reverses
//!   unauthorized changes
//! - [`BaselineBook`] remembers each role's last accepted state
//! - [`DenyListSweeper`] keeps deny-listed members out of every server
//! - [`OperatorConsole`] runs the `+` text commands
//!
//! All platform access goes through the [`ModerationGateway`] trait.
//!
//! # Example
//!
//! ```no_run
//! use bastion_guard::{EnforcementEngine, EngineSettings, ModerationGateway};
//! use bastion_store::{FeatureRegistry, IdentifierStore, StoreLayout};
//! use std::sync::Arc;
//!
//! # async fn example(gateway: Arc<dyn ModerationGateway>) -> bastion_error::BastionResult<()> {
//! let layout = StoreLayout::in_dir("./data");
//! let features = Arc::new(FeatureRegistry::open(layout.features_path()).await?);
//! let engine = EnforcementEngine::new(
//!     gateway,
//!     IdentifierStore::new(layout),
//!     features,
//!     EngineSettings::default(),
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod baseline;
mod command;
mod engine;
mod gateway;
mod notify;
mod policy;
mod resolver;
mod settings;
mod sweep;

pub use baseline::{BaselineBook, GuildContext, RevertGuard};
pub use command::{OperatorCommand, OperatorConsole, VIEW_CHUNK};
pub use engine::{EnforcementEngine, Outcome};
pub use gateway::{
    AuditEntry, AuditKind, GatewayResult, GuildSummary, ModerationGateway, OwnCapabilities,
};
pub use notify::tag;
pub use policy::PolicyView;
pub use resolver::AuditResolver;
pub use settings::{EngineSettings, EngineSettingsBuilder};
pub use sweep::{DenyListSweeper, SWEEP_BAN_REASON, SweepReport};

/// Result type for enforcement operations.
pub type GuardResult<T> = bastion_error::BastionResult<T>;
