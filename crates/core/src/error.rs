//! Error types for spatlag

use thiserror::Error;

/// Main error type for spatlag operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {name} = {value} ({reason})")]
    Configuration {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate feature identifier: {0}")]
    DuplicateId(String),

    #[error("Unknown entity identifier: {0}")]
    UnknownId(String),

    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Spatial analysis failed: {0}")]
    Analysis(#[source] Box<Error>),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::Configuration {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a pipeline failure, leaving already-wrapped errors alone.
    pub fn into_analysis(self) -> Self {
        match self {
            e @ Error::Analysis(_) => e,
            e => Error::Analysis(Box::new(e)),
        }
    }
}

/// Result type alias for spatlag operations
pub type Result<T> = std::result::Result<T, Error>;
