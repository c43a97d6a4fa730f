//! Platform identifiers.

use serde::{Deserialize, Serialize};

/// Minimum number of digits a member, role or channel identifier must have.
pub const MIN_SNOWFLAKE_DIGITS: usize = 5;

/// A raw numeric platform identifier (member, role, channel or guild).
///
/// Identifiers are kept in their textual form so that what is read from a
/// list file is written back unchanged.
///
/// # Examples
///
/// ```
/// use bastion_core::Snowflake;
///
/// assert!(Snowflake::parse("123456789012").is_some());
/// assert!(Snowflake::parse("1234").is_none());
/// assert_eq!(
///     Snowflake::from_mention("<@!123456789012>").unwrap().as_str(),
///     "123456789012"
/// );
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Snowflake(String);

impl Snowflake {
    /// Parse a bare identifier: ASCII digits only, at least [`MIN_SNOWFLAKE_DIGITS`] long.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let valid = raw.len() >= MIN_SNOWFLAKE_DIGITS && raw.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(raw.to_string()))
    }

    /// Parse user-typed text such as `<@!123…>`, `<@&123…>` or `123…`.
    ///
    /// Every non-digit character is discarded before validation.
    pub fn from_mention(raw: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        Self::parse(&digits)
    }

    /// Identifier from a numeric platform id.
    pub fn from_u64(id: u64) -> Self {
        Self(id.to_string())
    }

    /// Borrow the textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, when it fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl AsRef<str> for Snowflake {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self::from_u64(id)
    }
}
