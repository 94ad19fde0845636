//! Error types for pulse.
//!
//! Every fallible operation in the crate returns [`PulseError`]. The CLI maps
//! variants to process exit codes; the interactive session turns them into
//! status-line messages and keeps running.

use thiserror::Error;

/// Primary error type for pulse operations.
#[derive(Error, Debug)]
pub enum PulseError {
    /// Input rejected before reaching the store.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound {
        /// Kind of record ("entry", "timer", "template").
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The embedded database failed.
    #[error("Database error: {context}")]
    Store {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying SQLite error.
        #[source]
        source: rusqlite::Error,
    },

    /// A flexible date expression matched no known pattern.
    #[error("unable to parse date: {input}")]
    DateParse {
        /// The rejected input.
        input: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid configuration file contents.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Export error.
    #[error("Export failed: {message}")]
    ExportError {
        /// Human-readable error message.
        message: String,
        /// Underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// TUI error.
    #[error("TUI error: {message}")]
    TuiError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid argument.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the invalid argument.
        name: String,
        /// Reason why the argument is invalid.
        reason: String,
    },

    /// Unsupported operation or missing platform facility.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// Interrupted operation.
    #[error("Operation interrupted")]
    Interrupted,
}

impl PulseError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a store error with context.
    #[must_use]
    pub fn store(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Create a new export error.
    #[must_use]
    pub fn export(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new unsupported error.
    #[must_use]
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::DateParse { .. } | Self::InvalidArgument { .. } => 2,
            Self::NotFound { .. } => 3,
            Self::ConfigError { .. } | Self::InvalidConfig { .. } => 5,
            Self::ExportError { .. } => 6,
            Self::Store { .. } => 7,
            Self::Interrupted => 130,
            Self::IoError { .. } => 74,
            _ => 1,
        }
    }

    /// Whether the interactive session can report this error and continue.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::TuiError { .. } | Self::Interrupted)
    }
}

/// Result type alias for pulse operations.
pub type Result<T> = std::result::Result<T, PulseError>;

impl From<std::io::Error> for PulseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

impl From<rusqlite::Error> for PulseError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store {
            context: "query failed".to_string(),
            source: err,
        }
    }
}

impl From<csv::Error> for PulseError {
    fn from(err: csv::Error) -> Self {
        Self::ExportError {
            message: format!("CSV write failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// Input failed validation (bad text, category, or date).
    pub const EXIT_VALIDATION_ERROR: i32 = 2;
    /// Referenced entry or timer not found.
    pub const EXIT_NOT_FOUND: i32 = 3;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Export operation failed.
    pub const EXIT_EXPORT_ERROR: i32 = 6;
    /// Database operation failed.
    pub const EXIT_STORE_ERROR: i32 = 7;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
    /// Terminated by Ctrl+C (128 + SIGINT).
    pub const EXIT_INTERRUPTED: i32 = 130;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(PulseError::validation("empty").exit_code(), 2);
        assert_eq!(
            PulseError::DateParse {
                input: "soon".into()
            }
            .exit_code(),
            2
        );
        assert_eq!(PulseError::not_found("entry", 4).exit_code(), 3);
        assert_eq!(
            PulseError::store("insert", rusqlite::Error::InvalidQuery).exit_code(),
            7
        );
        assert_eq!(PulseError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            PulseError::not_found("entry", 12).to_string(),
            "entry with ID 12 not found"
        );
        assert_eq!(
            PulseError::DateParse {
                input: "whenever".into()
            }
            .to_string(),
            "unable to parse date: whenever"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(PulseError::validation("x").is_recoverable());
        assert!(!PulseError::Interrupted.is_recoverable());
    }
}
