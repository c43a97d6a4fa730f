//! Flat-file store error types.

/// Kinds of store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Failed to create the data directory
    #[display("Failed to create data directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Stored record could not be encoded or decoded
    #[display("Malformed record: {}", _0)]
    Malformed(String),
}

/// Store error with location tracking.
///
/// # Examples
///
/// ```
/// use bastion_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::FileWrite("whitelist.txt".to_string()));
/// assert!(format!("{}", err).contains("whitelist.txt"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        StoreError::new(StoreErrorKind::Malformed(err.to_string()))
    }
}
