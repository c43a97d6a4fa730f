//! Feature capabilities that gate each enforcement rule.

use serde::{Deserialize, Serialize};

/// A rule family that can be switched on or off at runtime.
///
/// The string form matches the keys of the persisted feature file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum Capability {
    /// Ban watcher: reverse unauthorized bans.
    #[strum(serialize = "ban")]
    #[serde(rename = "ban")]
    Ban,
    /// Kick watcher: deny-list kickers.
    #[strum(serialize = "kick")]
    #[serde(rename = "kick")]
    Kick,
    /// Bot-add watcher: remove unauthorized bots.
    #[strum(serialize = "botadd")]
    #[serde(rename = "botadd")]
    BotAdd,
    /// Channel-delete watcher.
    #[strum(serialize = "channel")]
    #[serde(rename = "channel")]
    Channel,
    /// Role-update watcher: revert permission/position drift.
    #[strum(serialize = "roleUpdate")]
    #[serde(rename = "roleUpdate")]
    RoleUpdate,
    /// Role-delete watcher.
    #[strum(serialize = "roleDelete")]
    #[serde(rename = "roleDelete")]
    RoleDelete,
}

impl Capability {
    /// Map an operator-typed name (including common aliases) to a capability.
    ///
    /// # Examples
    ///
    /// ```
    /// use bastion_core::Capability;
    ///
    /// assert_eq!(Capability::normalize("Bots"), Some(Capability::BotAdd));
    /// assert_eq!(Capability::normalize("ru"), Some(Capability::RoleUpdate));
    /// assert_eq!(Capability::normalize("nope"), None);
    /// ```
    pub fn normalize(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ban" | "bans" => Some(Self::Ban),
            "kick" | "kicks" => Some(Self::Kick),
            "botadd" | "bot" | "bots" => Some(Self::BotAdd),
            "channel" | "channels" | "ch" => Some(Self::Channel),
            "roleupdate" | "role" | "role-update" | "role_upd" | "ru" => Some(Self::RoleUpdate),
            "roledelete" | "role-del" | "rd" => Some(Self::RoleDelete),
            _ => None,
        }
    }
}
