//! Structured log notices.

use chrono::{DateTime, Utc};
use derive_getters::Getters;

/// Embed colours used by the agent.
pub mod palette {
    /// Enforcement alert.
    pub const ALERT: u32 = 0xff0033;
    /// Deny-list addition.
    pub const DENY: u32 = 0xcc0000;
    /// Successful reversal or acceptance.
    pub const SUCCESS: u32 = 0x22c55e;
    /// Reverted change or degraded action.
    pub const WARNING: u32 = 0xf59e0b;
    /// Kick detection.
    pub const KICK: u32 = 0xeab308;
    /// Bot removal.
    pub const BOT: u32 = 0xe11d48;
    /// Informational.
    pub const INFO: u32 = 0x60a5fa;
    /// Role snapshot.
    pub const SNAPSHOT: u32 = 0x3b82f6;
    /// Allow-list listing.
    pub const ALLOW: u32 = 0x24c4a1;
    /// Help output.
    pub const HELP: u32 = 0x8b5cf6;
    /// Disabled feature.
    pub const DISABLED: u32 = 0xef4444;
}

/// A titled, coloured, timestamped message for the log channel.
///
/// # Examples
///
/// ```
/// use bastion_core::{Notice, palette};
///
/// let notice = Notice::new("Auto-Unbanned", "Reversed ban of `123456`", palette::SUCCESS);
/// assert_eq!(notice.title(), "Auto-Unbanned");
/// ```
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct Notice {
    title: String,
    description: String,
    #[builder(default = "palette::ALERT")]
    color: u32,
    #[builder(default = "Utc::now()")]
    timestamp: DateTime<Utc>,
}

impl Notice {
    /// Create a notice stamped with the current time.
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_defaults() {
        let stamp = Utc.with_ymd_and_hms(2025, 10, 31, 12, 0, 0).unwrap();
        let notice = NoticeBuilder::default()
            .title("Added to Blacklist")
            .description("<@123456> `123456`")
            .timestamp(stamp)
            .build()
            .unwrap();
        assert_eq!(*notice.color(), palette::ALERT);
        assert_eq!(*notice.timestamp(), stamp);
    }
}
