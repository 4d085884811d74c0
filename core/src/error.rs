#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every variant is fatal to the current generation pass. The variants are kept
//! apart so hosts (and tests) can tell a user mistake in hand-written code from a
//! schema/configuration problem and from a broken calling contract.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Error-severity diagnostic raised while parsing existing user source.
    #[from(ignore)]
    #[display("{file}({line}): error: {message}")]
    Compilation {
        /// Logical name of the file the diagnostic originates from.
        file: String,
        /// 1-based line number of the offending token.
        line: usize,
        /// Compiler diagnostic message.
        message: String,
    },

    /// Invalid schema or options (duplicate aliases, name collisions, ...).
    #[from(ignore)]
    #[display("Configuration Error: {_0}")]
    Configuration(String),

    /// A caller broke the options contract (e.g. querying by CLR name before
    /// aliases were mapped).
    #[from(ignore)]
    #[display("Invalid State: {_0}")]
    InvalidState(String),

    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Schema or configuration documents that could not be (de)serialized.
    #[from(ignore)]
    #[display("Serialization Error: {_0}")]
    Serialization(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Builds a compilation error for a given file and line.
    pub fn compilation(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        AppError::Compilation {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Returns true for errors raised from user source diagnostics.
    pub fn is_compilation(&self) -> bool {
        matches!(self, AppError::Compilation { .. })
    }

    /// Returns true for schema / options configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_))
    }

    /// Returns true for programming contract violations.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, AppError::InvalidState(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_compilation_display_carries_location() {
        let err = AppError::compilation("Page.cs", 12, "; expected");
        assert_eq!(err.to_string(), "Page.cs(12): error: ; expected");
        assert!(err.is_compilation());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_kinds_are_distinct() {
        let cfg = AppError::Configuration("dup".into());
        let state = AppError::InvalidState("not mapped".into());
        assert!(cfg.is_configuration() && !cfg.is_invalid_state());
        assert!(state.is_invalid_state() && !state.is_configuration());
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }
}
