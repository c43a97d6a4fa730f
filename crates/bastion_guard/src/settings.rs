//! Tunables for the enforcement engine and the sweep.

use derive_getters::Getters;
use std::time::Duration;

/// Engine timing and messaging settings.
///
/// # Example
///
/// ```
/// use bastion_guard::EngineSettingsBuilder;
/// use std::time::Duration;
///
/// let settings = EngineSettingsBuilder::default()
///     .ban_retry_delay(Duration::from_millis(10))
///     .build()
///     .unwrap();
/// assert_eq!(*settings.audit_limit(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_setters::Setters, derive_builder::Builder)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct EngineSettings {
    /// How far back a ban audit entry may be and still count
    #[builder(default = "Duration::from_secs(60)")]
    ban_window: Duration,
    /// How far back any other audit entry may be and still count
    #[builder(default = "Duration::from_secs(15)")]
    event_window: Duration,
    /// Wait before the single retry of an empty ban lookup
    #[builder(default = "Duration::from_millis(1500)")]
    ban_retry_delay: Duration,
    /// Audit entries fetched per lookup
    #[builder(default = "5")]
    audit_limit: u8,
    /// Invite sent to kicked members
    #[builder(default = "\"https://discord.gg/sab-mm\".to_string()")]
    reinvite_url: String,
    /// Period of the deny-list sweep
    #[builder(default = "Duration::from_secs(1)")]
    sweep_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ban_window: Duration::from_secs(60),
            event_window: Duration::from_secs(15),
            ban_retry_delay: Duration::from_millis(1500),
            audit_limit: 5,
            reinvite_url: "https://discord.gg/sab-mm".to_string(),
            sweep_interval: Duration::from_secs(1),
        }
    }
}
