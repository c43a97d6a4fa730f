//! Persisted feature toggles.

use crate::atomic::{read_optional, write_atomic};
use bastion_core::Capability;
use bastion_error::{BastionResult, StoreError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};

/// On/off state of every [`Capability`].
///
/// Unknown keys in the file are ignored and missing keys take the default
/// (enabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    ban: bool,
    kick: bool,
    botadd: bool,
    channel: bool,
    #[serde(rename = "roleUpdate")]
    role_update: bool,
    #[serde(rename = "roleDelete")]
    role_delete: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            ban: true,
            kick: true,
            botadd: true,
            channel: true,
            role_update: true,
            role_delete: true,
        }
    }
}

impl FeatureFlags {
    /// Whether `capability` is on.
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::Ban => self.ban,
            Capability::Kick => self.kick,
            Capability::BotAdd => self.botadd,
            Capability::Channel => self.channel,
            Capability::RoleUpdate => self.role_update,
            Capability::RoleDelete => self.role_delete,
        }
    }

    /// Switch `capability` on or off.
    pub fn set(&mut self, capability: Capability, enabled: bool) {
        let slot = match capability {
            Capability::Ban => &mut self.ban,
            Capability::Kick => &mut self.kick,
            Capability::BotAdd => &mut self.botadd,
            Capability::Channel => &mut self.channel,
            Capability::RoleUpdate => &mut self.role_update,
            Capability::RoleDelete => &mut self.role_delete,
        };
        *slot = enabled;
    }

    /// Every capability with its state, in declaration order.
    pub fn entries(&self) -> Vec<(Capability, bool)> {
        Capability::iter().map(|c| (c, self.get(c))).collect()
    }

    /// One `• **name**: ENABLED|DISABLED` line per capability.
    pub fn pretty(&self) -> String {
        self.entries()
            .into_iter()
            .map(|(c, on)| format!("• **{}**: {}", c, if on { "ENABLED" } else { "DISABLED" }))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Feature flags held in memory and mirrored to a JSON file.
#[derive(Debug)]
pub struct FeatureRegistry {
    path: PathBuf,
    flags: RwLock<FeatureFlags>,
}

impl FeatureRegistry {
    /// Open the registry at `path` and load it.
    ///
    /// A missing or corrupt file yields the defaults, which are written back
    /// immediately.
    pub async fn open(path: impl AsRef<Path>) -> BastionResult<Self> {
        let registry = Self {
            path: path.as_ref().to_path_buf(),
            flags: RwLock::new(FeatureFlags::default()),
        };
        registry.load().await?;
        Ok(registry)
    }

    /// Registry with the given flags that has not touched the disk yet.
    pub fn with_flags(path: impl AsRef<Path>, flags: FeatureFlags) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flags: RwLock::new(flags),
        }
    }

    /// Reload from disk, falling back to (and persisting) defaults.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> BastionResult<FeatureFlags> {
        let parsed = match read_optional(&self.path).await {
            Ok(Some(raw)) => serde_json::from_str::<FeatureFlags>(&raw)
                .map_err(|e| warn!(error = %e, "Feature file corrupt, using defaults"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Feature file unreadable, using defaults");
                None
            }
        };

        match parsed {
            Some(flags) => {
                *self.flags.write() = flags;
                Ok(flags)
            }
            None => {
                let defaults = FeatureFlags::default();
                *self.flags.write() = defaults;
                self.save().await?;
                info!("Persisted default feature flags");
                Ok(defaults)
            }
        }
    }

    /// Write the in-memory flags to disk.
    pub async fn save(&self) -> BastionResult<()> {
        let flags = *self.flags.read();
        let json = serde_json::to_string_pretty(&flags).map_err(StoreError::from)?;
        write_atomic(&self.path, &json).await
    }

    /// Whether `capability` is on.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.flags.read().get(capability)
    }

    /// Switch one capability and persist.
    pub async fn set(&self, capability: Capability, enabled: bool) -> BastionResult<()> {
        self.flags.write().set(capability, enabled);
        info!(%capability, enabled, "Feature toggled");
        self.save().await
    }

    /// Switch several capabilities with a single write.
    pub async fn set_many(&self, capabilities: &[Capability], enabled: bool) -> BastionResult<()> {
        {
            let mut flags = self.flags.write();
            for capability in capabilities {
                flags.set(*capability, enabled);
            }
        }
        self.save().await
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> FeatureFlags {
        *self.flags.read()
    }
}
