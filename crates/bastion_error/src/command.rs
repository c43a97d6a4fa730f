//! Operator command error types.

/// Specific command error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CommandErrorKind {
    /// Input did not match the command's expected shape.
    #[display("Usage: {}", _0)]
    Usage(String),
}

/// Command error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Command Error: {} at line {} in {}", kind, line, file)]
pub struct CommandError {
    kind: CommandErrorKind,
    line: u32,
    file: &'static str,
}

impl CommandError {
    /// Create a new command error with caller location tracking.
    #[track_caller]
    pub fn new(kind: CommandErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CommandErrorKind {
        &self.kind
    }
}
