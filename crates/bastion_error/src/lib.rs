//! Error types for the Bastion moderation agent.
//!
//! This crate provides the foundation error types used throughout the Bastion workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use bastion_error::{BastionResult, ConfigError};
//!
//! fn load() -> BastionResult<String> {
//!     Err(ConfigError::invalid("data_dir", "directory does not exist"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod error;
mod gateway;
mod storage;

pub use command::{CommandError, CommandErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{BastionError, BastionErrorKind, BastionResult};
pub use gateway::{GatewayError, GatewayErrorKind};
pub use storage::{StoreError, StoreErrorKind};
