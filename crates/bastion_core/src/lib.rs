//! Core data types for the Bastion moderation agent.
//!
//! These types are shared by the store, the enforcement engine and the
//! platform adapter: identifiers, feature capabilities, role state and the
//! structured notices the agent posts to its log channel.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capability;
mod notice;
mod role;
mod snowflake;

pub use capability::Capability;
pub use notice::{Notice, NoticeBuilder, palette};
pub use role::{RoleBaseline, RoleState};
pub use snowflake::{MIN_SNOWFLAKE_DIGITS, Snowflake};
