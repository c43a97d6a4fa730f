//! Top-level error wrapper types.

use crate::{CommandError, ConfigError, GatewayError, StoreError};

/// Every error a Bastion crate can surface.
///
/// # Examples
///
/// ```
/// use bastion_error::{BastionError, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::FileRead("blacklist.txt".to_string()));
/// let err: BastionError = store_err.into();
/// assert!(format!("{}", err).contains("Store Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum BastionErrorKind {
    /// Flat-file store error
    #[from(StoreError)]
    Store(StoreError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Chat platform error
    #[from(GatewayError)]
    Gateway(GatewayError),
    /// Operator command error
    #[from(CommandError)]
    Command(CommandError),
}

/// Bastion error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Bastion Error: {}", _0)]
pub struct BastionError(Box<BastionErrorKind>);

impl BastionError {
    /// Create a new error from a kind.
    pub fn new(kind: BastionErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BastionErrorKind {
        &self.0
    }
}

impl<T> From<T> for BastionError
where
    T: Into<BastionErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Bastion operations.
pub type BastionResult<T> = std::result::Result<T, BastionError>;
