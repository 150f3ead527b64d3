//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing log text into operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: unrecognized trace line: {text}")]
    InvalidLine { line: usize, text: String },

    #[error("line {line}: unbalanced delimiters in arguments: {text}")]
    UnbalancedArguments { line: usize, text: String },

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised when a log is internally inconsistent
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("malformed count line: {0:?}")]
    MalformedCount(String),

    #[error("count index {found} out of order, expected {expected}")]
    IndexMismatch { expected: usize, found: usize },

    #[error("count for fragment {index} but only {available} fragments were logged")]
    UnknownFragment { index: usize, available: usize },
}

/// Errors that can occur while importing a whole log
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to parse trace: {0}")]
    Parse(#[from] ParseError),

    #[error("Inconsistent log: {0}")]
    Format(#[from] FormatError),
}

/// Errors that can occur while writing or reading reports
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
