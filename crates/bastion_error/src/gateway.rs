//! Chat platform gateway error types.

/// Kinds of failures reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GatewayErrorKind {
    /// The platform API call failed (network, rate limit, server error).
    #[display("Platform API error: {}", _0)]
    Api(String),

    /// The requested member, role, channel or guild does not exist.
    #[display("Not found: {}", _0)]
    NotFound(String),

    /// The agent lacks a permission the operation needs, or the role hierarchy forbids it.
    #[display("Missing capability: {}", _0)]
    MissingCapability(String),

    /// A direct message could not be delivered.
    #[display("User unreachable: {}", _0)]
    Unreachable(String),

    /// Identifier could not be converted to a platform id.
    #[display("Invalid identifier: {}", _0)]
    InvalidId(String),
}

/// Gateway error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gateway Error: {} at line {} in {}", kind, line, file)]
pub struct GatewayError {
    /// The kind of error that occurred
    pub kind: GatewayErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GatewayError {
    /// Create a new GatewayError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use bastion_error::{GatewayError, GatewayErrorKind};
    ///
    /// let err = GatewayError::new(GatewayErrorKind::NotFound("member 12345".to_string()));
    /// assert!(matches!(err.kind(), GatewayErrorKind::NotFound(_)));
    /// ```
    #[track_caller]
    pub fn new(kind: GatewayErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GatewayErrorKind {
        &self.kind
    }
}
