//! Configuration error types.

/// What was wrong with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// The configuration file could not be read.
    #[display("Failed to read config file {path}: {reason}")]
    Read {
        /// File that was requested
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// The configuration file is not valid TOML for the expected shape.
    #[display("Failed to parse config {path}: {reason}")]
    Parse {
        /// File being parsed
        path: String,
        /// Parser message, including the offending key
        reason: String,
    },

    /// A setting parsed but holds a value the agent cannot run with.
    #[display("Invalid value for {field}: {reason}")]
    InvalidField {
        /// Name of the setting as written in the file
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use bastion_error::{ConfigError, ConfigErrorKind};
    ///
    /// let err = ConfigError::invalid("sweep_interval_ms", "must be greater than zero");
    /// assert!(matches!(
    ///     err.kind(),
    ///     ConfigErrorKind::InvalidField { field: "sweep_interval_ms", .. }
    /// ));
    /// assert!(err.to_string().contains("sweep_interval_ms"));
    /// ```
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`ConfigErrorKind::InvalidField`].
    #[track_caller]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidField {
            field,
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
