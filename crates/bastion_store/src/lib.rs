//! Flat-file persistence for the Bastion moderation agent.
//!
//! Everything the agent remembers between restarts lives in a single data
//! directory as small human-editable files:
//!
//! - **Identifier sets** (`blacklist.txt`, `whitelist.txt`, `allowedUsers.txt`,
//!   `tickets.txt`) - one identifier per line
//! - **Feature flags** (`features.json`) - capability name to boolean
//! - **Incentive ledger** (`profit.txt`) - JSON record keyed by identifier
//! - **Seen members** (`user_ids.txt`) - append-only identifier log
//!
//! Every mutation rewrites its file through a temporary file and a rename, so a
//! reader never observes a half-written set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod atomic;
mod features;
mod identifier_set;
mod layout;
mod ledger;
mod seen;

pub use features::{FeatureFlags, FeatureRegistry};
pub use identifier_set::{IdentifierSet, IdentifierStore, SetName};
pub use layout::{StoreLayout, StoreLayoutBuilder};
pub use ledger::{IncentiveLedger, LedgerEntry, LedgerRecord, format_usd, parse_amount};
pub use seen::SeenMembers;
